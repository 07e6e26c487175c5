//! 종목별 시세 probe 및 활성 상태 반영 모듈.
//!
//! 스냅샷의 Row를 순서대로 하나씩 probe하고, 결과를 Row와 원격 DB에 기록합니다.
//! 한 종목의 실패는 해당 Row를 비활성으로 만들 뿐 나머지 처리를 막지 않습니다.

use crate::config::ProbeConfig;
use crate::{ReconcileStats, Result};
use portfolio_data::{
    ActiveStatus, Bar, DataError, MarketProbe, ProbeWindow, SeriesWriter, Snapshot,
    SnapshotStore, StatusWriter,
};
use std::time::{Duration, Instant};

/// Row 하나의 probe 판정.
#[derive(Debug)]
enum ProbeOutcome {
    /// 두 시계열 모두 데이터 있음 (저장한 파일 수)
    Active { files: usize },
    /// 조회는 성공했지만 데이터 없음
    Empty,
    /// probe 또는 파일 저장 실패
    Failed(String),
}

/// 스냅샷 전체 probe 및 상태 반영.
///
/// 모든 Row는 처리 후 `True` 또는 `False` 상태를 가지며,
/// 상태 쓰기는 Row마다 정확히 한 번 호출됩니다.
pub async fn reconcile<P, W>(
    snapshot: &mut Snapshot,
    probe: &P,
    writer: &W,
    series: &SeriesWriter,
    config: &ProbeConfig,
) -> ReconcileStats
where
    P: MarketProbe + ?Sized,
    W: StatusWriter + ?Sized,
{
    let start = Instant::now();
    let mut stats = ReconcileStats::new();
    let total = snapshot.len();

    tracing::info!(
        rows = total,
        provider = probe.name(),
        stamp = series.stamp(),
        "상태 probe 시작"
    );

    for (idx, row) in snapshot.rows.iter_mut().enumerate() {
        stats.total += 1;

        tracing::debug!(
            id = %row.id,
            symbol = row.ticker_symbol.as_deref().unwrap_or("-"),
            progress = format!("{}/{}", idx + 1, total),
            "probe 시작"
        );

        let outcome = match row.ticker_symbol.as_deref() {
            Some(symbol) => probe_symbol(probe, series, config, symbol).await,
            None => ProbeOutcome::Failed("ticker symbol is missing".to_string()),
        };

        let active = match outcome {
            ProbeOutcome::Active { files } => {
                stats.active += 1;
                stats.series_files += files;
                tracing::info!(id = %row.id, symbol = row.ticker_symbol.as_deref(), "활성 판정");
                true
            }
            ProbeOutcome::Empty => {
                stats.inactive += 1;
                stats.empty += 1;
                tracing::warn!(id = %row.id, symbol = row.ticker_symbol.as_deref(), "데이터 없음, 비활성 판정");
                false
            }
            ProbeOutcome::Failed(reason) => {
                stats.inactive += 1;
                stats.errors += 1;
                tracing::error!(
                    id = %row.id,
                    symbol = row.ticker_symbol.as_deref(),
                    error = %reason,
                    "probe 실패, 비활성 판정"
                );
                false
            }
        };

        row.is_active = ActiveStatus::from_bool(active);

        let ack = writer.write_status(&row.id, active).await;
        if !ack.is_success() {
            stats.write_failures += 1;
        }

        // Rate limiting
        if idx + 1 < total && config.request_delay_ms > 0 {
            tokio::time::sleep(config.request_delay()).await;
        }
    }

    stats.elapsed = start.elapsed();
    stats
}

/// 저장된 스냅샷을 로드해 probe 후 한 번만 다시 저장.
pub async fn probe_portfolio<P, W>(
    store: &SnapshotStore,
    probe: &P,
    writer: &W,
    series: &SeriesWriter,
    config: &ProbeConfig,
) -> Result<(Snapshot, ReconcileStats)>
where
    P: MarketProbe + ?Sized,
    W: StatusWriter + ?Sized,
{
    let mut snapshot = store.load()?;

    let stats = reconcile(&mut snapshot, probe, writer, series, config).await;
    store.save(&snapshot)?;

    Ok((snapshot, stats))
}

/// 한 종목의 두 시계열을 순서대로 조회하고 판정.
async fn probe_symbol<P>(
    probe: &P,
    series: &SeriesWriter,
    config: &ProbeConfig,
    symbol: &str,
) -> ProbeOutcome
where
    P: MarketProbe + ?Sized,
{
    let fine = match fetch_window(probe, symbol, &config.fine, config.timeout()).await {
        Ok(bars) => bars,
        Err(e) => return ProbeOutcome::Failed(e.to_string()),
    };

    let coarse = match fetch_window(probe, symbol, &config.coarse, config.timeout()).await {
        Ok(bars) => bars,
        Err(e) => return ProbeOutcome::Failed(e.to_string()),
    };

    if fine.is_empty() || coarse.is_empty() {
        return ProbeOutcome::Empty;
    }

    for (window, bars) in [(&config.fine, &fine), (&config.coarse, &coarse)] {
        if let Err(e) = series.write(symbol, &window.label, bars) {
            return ProbeOutcome::Failed(format!("series write failed: {}", e));
        }
    }

    ProbeOutcome::Active { files: 2 }
}

/// probe 한 번 호출 (타임아웃 적용).
async fn fetch_window<P>(
    probe: &P,
    symbol: &str,
    window: &ProbeWindow,
    timeout: Option<Duration>,
) -> portfolio_data::Result<Vec<Bar>>
where
    P: MarketProbe + ?Sized,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, probe.probe(symbol, window))
            .await
            .map_err(|_| {
                DataError::FetchError(format!(
                    "probe timed out after {}s ({} {})",
                    limit.as_secs(),
                    symbol,
                    window.interval
                ))
            })?,
        None => probe.probe(symbol, window).await,
    }
}
