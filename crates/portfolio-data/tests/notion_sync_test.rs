//! Notion 클라이언트 통합 테스트 (mockito 서버 사용).

use mockito::Matcher;
use portfolio_data::{ActiveStatus, CellValue, NotionClient, NotionConfig, StatusAck, StatusWriter};
use serde_json::{json, Value};

const DATABASE_ID: &str = "db-1";
const QUERY_PATH: &str = "/v1/databases/db-1/query";

fn client_for(server: &mockito::Server) -> NotionClient {
    NotionClient::new(NotionConfig::new("secret-token", DATABASE_ID).with_base_url(server.url()))
        .expect("client")
}

fn record(id: &str, ticker: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "TickerSymbol": {
                "id": "title",
                "type": "title",
                "title": [{"type": "text", "text": {"content": ticker}, "plain_text": ticker}]
            },
            "is_active": {"id": "a1", "type": "select", "select": null},
            "Sector": {"id": "s1", "type": "multi_select", "multi_select": [{"name": "Tech"}, {"name": "US"}]}
        }
    })
}

fn page(results: Vec<Value>, next_cursor: Option<&str>) -> String {
    json!({
        "object": "list",
        "results": results,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor
    })
    .to_string()
}

#[tokio::test]
async fn test_pagination_follows_cursors_in_order() {
    let mut server = mockito::Server::new_async().await;

    let first = server
        .mock("POST", QUERY_PATH)
        .match_header("authorization", "Bearer secret-token")
        .match_header("notion-version", "2022-06-28")
        .match_body(Matcher::Json(json!({"page_size": 100})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(vec![record("p1", "AAA"), record("p2", "BBB")], Some("cursor-2")))
        .expect(1)
        .create_async()
        .await;

    let second = server
        .mock("POST", QUERY_PATH)
        .match_body(Matcher::Json(json!({"page_size": 100, "start_cursor": "cursor-2"})))
        .with_status(200)
        .with_body(page(
            vec![record("p3", "CCC"), json!({"object": "page", "properties": {}})],
            Some("cursor-3"),
        ))
        .expect(1)
        .create_async()
        .await;

    let third = server
        .mock("POST", QUERY_PATH)
        .match_body(Matcher::Json(json!({"page_size": 100, "start_cursor": "cursor-3"})))
        .with_status(200)
        .with_body(page(vec![json!({"object": "page", "id": "p4", "properties": null})], None))
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let (snapshot, stats) = client.fetch_snapshot().await;

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;

    assert!(!stats.aborted);
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.records, 5);
    assert_eq!(stats.skipped, 1);

    let ids: Vec<&str> = snapshot.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3", "p4"]);

    let first_row = &snapshot.rows[0];
    assert_eq!(first_row.ticker_symbol.as_deref(), Some("AAA"));
    assert_eq!(first_row.is_active, ActiveStatus::Unset);
    assert_eq!(first_row.properties["Sector"], CellValue::from("Tech, US"));

    // properties가 null인 레코드는 빈 Row로 유지
    let last_row = &snapshot.rows[3];
    assert!(last_row.ticker_symbol.is_none());
    assert!(last_row.properties.is_empty());
}

#[tokio::test]
async fn test_error_on_later_page_yields_empty_table() {
    let mut server = mockito::Server::new_async().await;

    let _first = server
        .mock("POST", QUERY_PATH)
        .match_body(Matcher::Json(json!({"page_size": 100})))
        .with_status(200)
        .with_body(page(vec![record("p1", "AAA")], Some("cursor-2")))
        .create_async()
        .await;

    let _second = server
        .mock("POST", QUERY_PATH)
        .match_body(Matcher::Json(json!({"page_size": 100, "start_cursor": "cursor-2"})))
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let (snapshot, stats) = client_for(&server).fetch_snapshot().await;

    assert!(snapshot.is_empty());
    assert!(stats.aborted);
    assert_eq!(stats.pages, 1);
}

#[tokio::test]
async fn test_first_page_server_error_yields_empty_table() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", QUERY_PATH)
        .with_status(500)
        .with_body(r#"{"object":"error","status":500}"#)
        .expect(1)
        .create_async()
        .await;

    let (snapshot, stats) = client_for(&server).fetch_snapshot().await;

    mock.assert_async().await;
    assert!(snapshot.is_empty());
    assert!(stats.aborted);
    assert_eq!(stats.pages, 0);
}

#[tokio::test]
async fn test_missing_results_field_yields_empty_table() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", QUERY_PATH)
        .with_status(200)
        .with_body(r#"{"object":"list","has_more":false}"#)
        .create_async()
        .await;

    let (snapshot, stats) = client_for(&server).fetch_snapshot().await;

    assert!(snapshot.is_empty());
    assert!(stats.aborted);
}

#[tokio::test]
async fn test_has_more_without_cursor_aborts() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", QUERY_PATH)
        .with_status(200)
        .with_body(
            json!({"results": [record("p1", "AAA")], "has_more": true, "next_cursor": null})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let (snapshot, stats) = client_for(&server).fetch_snapshot().await;

    assert!(snapshot.is_empty());
    assert!(stats.aborted);
}

#[tokio::test]
async fn test_refetch_is_idempotent() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", QUERY_PATH)
        .with_status(200)
        .with_body(page(vec![record("p1", "AAA"), record("p2", "BBB")], None))
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let (first, _) = client.fetch_snapshot().await;
    let (second, _) = client.fetch_snapshot().await;

    mock.assert_async().await;
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_status_write_sends_select_name() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("PATCH", "/v1/pages/p1")
        .match_header("authorization", "Bearer secret-token")
        .match_header("content-type", "application/json")
        .match_header("notion-version", "2022-06-28")
        .match_body(Matcher::Json(json!({
            "properties": {"is_active": {"select": {"name": "True"}}}
        })))
        .with_status(200)
        .with_body(r#"{"object":"page","id":"p1"}"#)
        .expect(1)
        .create_async()
        .await;

    let ack = client_for(&server).write_status("p1", true).await;

    mock.assert_async().await;
    assert_eq!(ack, StatusAck::Updated);
}

#[tokio::test]
async fn test_status_write_rejection_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("PATCH", "/v1/pages/p2")
        .match_body(Matcher::Json(json!({
            "properties": {"is_active": {"select": {"name": "False"}}}
        })))
        .with_status(400)
        .with_body("validation_error")
        .create_async()
        .await;

    let ack = client_for(&server).write_status("p2", false).await;

    assert_eq!(
        ack,
        StatusAck::Rejected {
            status: 400,
            body: "validation_error".to_string()
        }
    );
}

#[tokio::test]
async fn test_status_write_requires_200() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("PATCH", "/v1/pages/p1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let ack = client_for(&server).write_status("p1", true).await;

    assert!(matches!(ack, StatusAck::Rejected { status: 204, .. }));
}

#[tokio::test]
async fn test_query_non_200_success_status_aborts() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", QUERY_PATH)
        .with_status(202)
        .with_body(page(vec![record("p1", "AAA")], None))
        .create_async()
        .await;

    let (snapshot, stats) = client_for(&server).fetch_snapshot().await;

    assert!(snapshot.is_empty());
    assert!(stats.aborted);
}

#[tokio::test]
async fn test_status_write_unreachable_server() {
    let client = NotionClient::new(
        NotionConfig::new("secret-token", DATABASE_ID).with_base_url("http://127.0.0.1:1"),
    )
    .unwrap();

    let ack = client.write_status("p1", true).await;
    assert!(matches!(ack, StatusAck::Failed(_)));
}
