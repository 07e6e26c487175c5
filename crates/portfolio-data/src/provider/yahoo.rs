//! 시세 데이터 probe.
//!
//! 심볼, 간격, 조회 기간을 받아 시계열을 돌려주거나 실패합니다.
//! 빈 시계열은 오류가 아니며, 판정은 호출 측이 합니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use yahoo_finance_api::{Quote, YahooError};

/// probe 한 번의 간격/기간 조합.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeWindow {
    /// Yahoo 간격 문자열 (예: "1m", "1d")
    pub interval: String,
    /// Yahoo 기간 문자열 (예: "7d", "1y")
    pub range: String,
    /// 결과 파일 이름에 쓰는 라벨 (예: "1min", "1day")
    pub label: String,
}

impl ProbeWindow {
    pub fn new(
        interval: impl Into<String>,
        range: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            interval: interval.into(),
            range: range.into(),
            label: label.into(),
        }
    }

    /// 1분봉, 최근 7일
    pub fn fine() -> Self {
        Self::new("1m", "7d", "1min")
    }

    /// 일봉, 최근 1년
    pub fn coarse() -> Self {
        Self::new("1d", "1y", "1day")
    }
}

/// 시계열 한 봉.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adj_close: Decimal,
    pub volume: u64,
}

/// 시세 probe trait.
#[async_trait]
pub trait MarketProbe: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 시계열 조회 (데이터 없음은 빈 Vec).
    async fn probe(&self, symbol: &str, window: &ProbeWindow) -> Result<Vec<Bar>>;
}

/// Yahoo Finance probe.
pub struct YahooProbe {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooProbe {
    pub fn new() -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance connection failed: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl MarketProbe for YahooProbe {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn probe(&self, symbol: &str, window: &ProbeWindow) -> Result<Vec<Bar>> {
        debug!(
            symbol = symbol,
            interval = %window.interval,
            range = %window.range,
            "Yahoo Finance API call"
        );

        let response = self
            .connector
            .get_quote_range(symbol, &window.interval, &window.range)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API error ({}): {}", symbol, e)))?;

        quotes_to_bars(symbol, response.quotes())
    }
}

/// 조회 결과를 시간순 Bar 목록으로 변환.
///
/// 데이터가 없는 응답(`NoQuotes`)은 오류가 아니라 빈 시계열입니다.
fn quotes_to_bars(
    symbol: &str,
    quotes: std::result::Result<Vec<Quote>, YahooError>,
) -> Result<Vec<Bar>> {
    let quotes = match quotes {
        Ok(quotes) => quotes,
        Err(YahooError::NoQuotes) => {
            debug!(symbol = symbol, "Yahoo Finance returned no quotes");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(DataError::ParseError(format!(
                "Quote parse error ({}): {}",
                symbol, e
            )))
        }
    };

    let mut bars: Vec<Bar> = quotes
        .iter()
        .filter_map(|q| {
            let time = Utc.timestamp_opt(q.timestamp, 0).single()?;
            Some(Bar {
                time,
                open: Decimal::from_f64_retain(q.open).unwrap_or_default(),
                high: Decimal::from_f64_retain(q.high).unwrap_or_default(),
                low: Decimal::from_f64_retain(q.low).unwrap_or_default(),
                close: Decimal::from_f64_retain(q.close).unwrap_or_default(),
                adj_close: Decimal::from_f64_retain(q.adjclose).unwrap_or_default(),
                volume: q.volume,
            })
        })
        .collect();

    bars.sort_by_key(|b| b.time);
    Ok(bars)
}
