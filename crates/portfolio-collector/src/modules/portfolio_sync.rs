//! 원격 DB → 로컬 스냅샷 동기화 모듈.

use crate::error::CollectorError;
use crate::{Result, SyncStats};
use portfolio_data::{NotionClient, Snapshot, SnapshotStore};
use std::time::Instant;

/// 원격 DB 전체를 조회해 스냅샷 파일로 저장.
///
/// 조회가 중단되면 기존 스냅샷을 덮어쓰지 않고 [`CollectorError::SyncAborted`]를 반환합니다.
pub async fn sync_portfolio(
    client: &NotionClient,
    store: &SnapshotStore,
) -> Result<(Snapshot, SyncStats)> {
    let start = Instant::now();

    tracing::info!(path = %store.path().display(), "포트폴리오 동기화 시작");

    let (snapshot, fetch) = client.fetch_snapshot().await;

    if fetch.aborted {
        tracing::error!(pages = fetch.pages, "원격 DB 조회 실패, 스냅샷을 저장하지 않습니다");
        return Err(CollectorError::SyncAborted { pages: fetch.pages });
    }

    if snapshot.is_empty() {
        tracing::warn!("원격 DB에 레코드가 없습니다");
    }

    store.save(&snapshot)?;

    let mut stats = SyncStats::from_fetch(&fetch, snapshot.len());
    stats.elapsed = start.elapsed();
    Ok((snapshot, stats))
}
