//! 원격 구조화 DB(Notion API) 클라이언트.
//!
//! 두 가지 동기화 방향만 지원합니다.
//!
//! - **조회**: 커서 기반 페이지네이션으로 DB 전체를 읽어 [`Snapshot`]으로 변환
//! - **갱신**: 레코드 하나의 상태 select 속성을 `"True"` / `"False"`로 변경
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use portfolio_data::provider::notion::{NotionClient, NotionConfig};
//!
//! let client = NotionClient::new(NotionConfig::new(token, database_id))?;
//! let (snapshot, stats) = client.fetch_snapshot().await;
//! let ack = client.write_status(&snapshot.rows[0].id, true).await;
//! ```

use crate::error::{DataError, Result};
use crate::model::{ActiveStatus, Row, RowSchema, Snapshot};
use crate::provider::property::decode_properties;
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 페이지당 요청 레코드 수
pub const PAGE_SIZE: usize = 100;

/// 기본 API 주소
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// 기본 API 버전 헤더 값
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Notion 클라이언트 설정.
#[derive(Debug)]
pub struct NotionConfig {
    /// API 토큰
    pub api_token: SecretString,
    /// 대상 데이터베이스 ID
    pub database_id: String,
    /// API 주소 (테스트/프록시용으로 변경 가능)
    pub base_url: String,
    /// `Notion-Version` 헤더
    pub notion_version: String,
    /// HTTP 요청 타임아웃
    pub timeout: Duration,
    /// 티커/상태 속성 이름
    pub schema: RowSchema,
}

impl NotionConfig {
    /// 기본값으로 설정 생성.
    pub fn new(api_token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            api_token: SecretString::from(api_token.into()),
            database_id: database_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            schema: RowSchema::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_schema(mut self, schema: RowSchema) -> Self {
        self.schema = schema;
        self
    }
}

/// 조회 응답의 레코드 한 건.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    pub id: Option<String>,
    /// `None`이면 속성이 없거나 객체가 아님
    pub properties: Option<serde_json::Map<String, Value>>,
}

impl RemoteRecord {
    fn from_value(value: &Value) -> Self {
        Self {
            id: value
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string),
            properties: value.get("properties").and_then(Value::as_object).cloned(),
        }
    }
}

/// 조회 응답 한 페이지.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub results: Vec<RemoteRecord>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// 전체 조회 통계.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// 요청한 페이지 수
    pub pages: usize,
    /// 받은 레코드 수
    pub records: usize,
    /// ID가 없어 건너뛴 레코드 수
    pub skipped: usize,
    /// 전송/프로토콜 오류로 중단되었는지 여부
    pub aborted: bool,
}

/// 상태 쓰기 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAck {
    /// 200 응답
    Updated,
    /// 성공이 아닌 응답
    Rejected { status: u16, body: String },
    /// 응답을 받지 못함
    Failed(String),
}

impl StatusAck {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// 레코드 하나의 상태를 원격 DB에 기록하는 trait.
///
/// 실패해도 오류를 반환하지 않고 [`StatusAck`]로 알립니다.
#[async_trait]
pub trait StatusWriter: Send + Sync {
    async fn write_status(&self, record_id: &str, is_active: bool) -> StatusAck;
}

/// Notion API 클라이언트.
pub struct NotionClient {
    client: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    /// 새 클라이언트 생성.
    ///
    /// 데이터베이스 ID가 비어 있으면 네트워크 요청 전에 실패합니다.
    pub fn new(config: NotionConfig) -> Result<Self> {
        if config.database_id.trim().is_empty() {
            return Err(DataError::ConfigError(
                "database_id is empty. Please provide a valid database id".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn schema(&self) -> &RowSchema {
        &self.config.schema
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// 페이지 하나 조회.
    ///
    /// 200이 아닌 상태 코드나 `results` 필드 누락은 오류입니다.
    pub async fn query_page(&self, start_cursor: Option<&str>) -> Result<QueryPage> {
        let url = self.endpoint(&format!(
            "/v1/databases/{}/query",
            self.config.database_id
        ));

        let mut payload = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = start_cursor {
            payload["start_cursor"] = json!(cursor);
        }

        debug!(url = %url, start_cursor = ?start_cursor, "Querying remote database page");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .header("Notion-Version", &self.config.notion_version)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(DataError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = serde_json::from_str(&body)?;

        let results = data
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                DataError::InvalidResponse(format!(
                    "'results' field is missing in the response: {}",
                    data
                ))
            })?;

        Ok(QueryPage {
            results: results.iter().map(RemoteRecord::from_value).collect(),
            has_more: data.get("has_more").and_then(Value::as_bool).unwrap_or(false),
            next_cursor: data
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// 전체 레코드를 조회해 스냅샷 생성 (오류 전파).
    pub async fn try_fetch_snapshot(&self, stats: &mut FetchStats) -> Result<Snapshot> {
        let schema = &self.config.schema;
        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.query_page(cursor.as_deref()).await?;
            stats.pages += 1;
            stats.records += page.results.len();

            for record in page.results {
                let id = match record.id {
                    Some(id) if !id.is_empty() => id,
                    _ => {
                        warn!("Record without id in query results, skipping");
                        stats.skipped += 1;
                        continue;
                    }
                };

                let properties = match record.properties {
                    Some(ref map) => decode_properties(map),
                    None => {
                        warn!(id = %id, "'properties' field is missing or null, keeping empty row");
                        Default::default()
                    }
                };

                rows.push(Row::from_decoded(id, properties, schema));
            }

            debug!(page = stats.pages, rows = rows.len(), has_more = page.has_more, "Page decoded");

            if !page.has_more {
                break;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    return Err(DataError::InvalidResponse(
                        "has_more is true but next_cursor is missing".to_string(),
                    ))
                }
            }
        }

        Ok(Snapshot::new(rows))
    }

    /// 전체 레코드를 조회해 스냅샷 생성.
    ///
    /// 어느 페이지에서든 전송/프로토콜 오류가 나면 부분 결과 없이
    /// 빈 스냅샷을 반환하고 `aborted`를 표시합니다.
    pub async fn fetch_snapshot(&self) -> (Snapshot, FetchStats) {
        let mut stats = FetchStats::default();

        match self.try_fetch_snapshot(&mut stats).await {
            Ok(snapshot) => {
                info!(
                    pages = stats.pages,
                    rows = snapshot.len(),
                    skipped = stats.skipped,
                    "Remote database fetched"
                );
                (snapshot, stats)
            }
            Err(e) => {
                error!(page = stats.pages + 1, error = %e, "Remote database fetch aborted");
                stats.aborted = true;
                (Snapshot::default(), stats)
            }
        }
    }

    /// 레코드 하나의 상태 select 속성 갱신.
    pub async fn update_status(&self, page_id: &str, status: ActiveStatus) -> StatusAck {
        let url = self.endpoint(&format!("/v1/pages/{}", page_id));
        let property = self.config.schema.status_property.as_str();
        let body = json!({
            "properties": {
                property: {
                    "select": { "name": status.as_select_name() }
                }
            }
        });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .header("Notion-Version", &self.config.notion_version)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status() == StatusCode::OK => {
                info!(page_id = page_id, status = ?status, "Successfully updated page");
                StatusAck::Updated
            }
            Ok(response) => {
                let status_code = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                warn!(
                    page_id = page_id,
                    status_code = status_code,
                    body = %body,
                    "Failed to update page"
                );
                StatusAck::Rejected {
                    status: status_code,
                    body,
                }
            }
            Err(e) => {
                warn!(page_id = page_id, error = %e, "Failed to send page update");
                StatusAck::Failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl StatusWriter for NotionClient {
    async fn write_status(&self, record_id: &str, is_active: bool) -> StatusAck {
        self.update_status(record_id, ActiveStatus::from_bool(is_active))
            .await
    }
}
