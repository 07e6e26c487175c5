//! 전체 워크플로우 (동기화 → probe).

use crate::config::ProbeConfig;
use crate::modules::{reconcile, sync_portfolio};
use crate::{ReconcileStats, Result};
use portfolio_data::{MarketProbe, NotionClient, SeriesWriter, SnapshotStore};

/// 동기화 후 probe 실행.
///
/// 동기화가 실패하면 probe 없이 에러를 반환하고, 레코드가 없으면 `None`을 반환합니다.
/// 원격 상태 쓰기는 동기화에 사용한 클라이언트로 합니다.
pub async fn run_all<P>(
    client: &NotionClient,
    probe: &P,
    store: &SnapshotStore,
    series: &SeriesWriter,
    config: &ProbeConfig,
) -> Result<Option<ReconcileStats>>
where
    P: MarketProbe + ?Sized,
{
    tracing::info!("Step 1/2: 포트폴리오 동기화");
    let (mut snapshot, sync_stats) = sync_portfolio(client, store).await?;
    sync_stats.log_summary("포트폴리오 동기화");

    if snapshot.is_empty() {
        tracing::warn!("동기화된 종목이 없어 probe를 건너뜁니다");
        return Ok(None);
    }

    tracing::info!("Step 2/2: 상태 probe");
    let stats = reconcile(&mut snapshot, probe, client, series, config).await;
    store.save(&snapshot)?;
    stats.log_summary("상태 probe");

    Ok(Some(stats))
}
