//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use chrono::{DateTime, Local};
use portfolio_data::provider::notion::{DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
use portfolio_data::{NotionConfig, ProbeWindow, RowSchema, SeriesWriter, SnapshotStore};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug)]
pub struct CollectorConfig {
    /// 원격 DB 설정
    pub notion: NotionSettings,
    /// 티커/상태 속성 이름
    pub schema: RowSchema,
    /// 로컬 저장 설정
    pub storage: StorageConfig,
    /// probe 설정
    pub probe: ProbeConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 원격 DB 설정
#[derive(Debug)]
pub struct NotionSettings {
    /// API 토큰
    pub api_token: SecretString,
    /// 데이터베이스 ID
    pub database_id: String,
    /// API 주소
    pub base_url: String,
    /// `Notion-Version` 헤더
    pub version: String,
    /// HTTP 타임아웃 (초)
    pub timeout_secs: u64,
}

/// 로컬 저장 설정
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// 스냅샷 파일 경로
    pub snapshot_path: PathBuf,
    /// 시계열 CSV 디렉토리
    pub series_dir: PathBuf,
}

/// probe 설정
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// 짧은 간격, 짧은 기간
    pub fine: ProbeWindow,
    /// 긴 간격, 긴 기간
    pub coarse: ProbeWindow,
    /// probe 호출당 타임아웃 (초, 없으면 무제한)
    pub timeout_secs: Option<u64>,
    /// 종목 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            fine: ProbeWindow::fine(),
            coarse: ProbeWindow::coarse(),
            timeout_secs: None,
            request_delay_ms: 0,
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드 (`.env` 포함)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로 설정 생성
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = required(&lookup, "NOTION_API_TOKEN")?;
        let database_id = required(&lookup, "DATABASE_ID")?;

        let defaults = ProbeConfig::default();

        Ok(Self {
            notion: NotionSettings {
                api_token: SecretString::from(api_token),
                database_id,
                base_url: lookup("NOTION_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                version: lookup("NOTION_VERSION")
                    .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
                timeout_secs: parse_or(&lookup, "NOTION_TIMEOUT_SECS", 30),
            },
            schema: RowSchema {
                ticker_property: lookup("TICKER_PROPERTY")
                    .unwrap_or_else(|| RowSchema::default().ticker_property),
                status_property: lookup("STATUS_PROPERTY")
                    .unwrap_or_else(|| RowSchema::default().status_property),
            },
            storage: StorageConfig {
                snapshot_path: lookup("SNAPSHOT_PATH")
                    .unwrap_or_else(|| "portfolio.json".to_string())
                    .into(),
                series_dir: lookup("SERIES_DIR")
                    .unwrap_or_else(|| "data".to_string())
                    .into(),
            },
            probe: ProbeConfig {
                fine: ProbeWindow::new(
                    lookup("PROBE_FINE_INTERVAL").unwrap_or(defaults.fine.interval),
                    lookup("PROBE_FINE_RANGE").unwrap_or(defaults.fine.range),
                    defaults.fine.label,
                ),
                coarse: ProbeWindow::new(
                    lookup("PROBE_COARSE_INTERVAL").unwrap_or(defaults.coarse.interval),
                    lookup("PROBE_COARSE_RANGE").unwrap_or(defaults.coarse.range),
                    defaults.coarse.label,
                ),
                timeout_secs: lookup("PROBE_TIMEOUT_SECS").and_then(|v| v.parse().ok()),
                request_delay_ms: parse_or(&lookup, "PROBE_REQUEST_DELAY_MS", 0),
            },
            daemon: DaemonConfig {
                // 0분 주기는 허용하지 않음
                interval_minutes: parse_or(&lookup, "DAEMON_INTERVAL_MINUTES", 60u64).max(1),
            },
        })
    }

    /// 원격 DB 클라이언트 설정 생성
    pub fn notion_config(&self) -> NotionConfig {
        let mut config = NotionConfig::new(
            self.notion.api_token.expose_secret(),
            self.notion.database_id.clone(),
        )
        .with_base_url(self.notion.base_url.clone())
        .with_schema(self.schema.clone());
        config.notion_version = self.notion.version.clone();
        config.timeout = Duration::from_secs(self.notion.timeout_secs);
        config
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(self.storage.snapshot_path.clone())
    }

    pub fn series_writer(&self, run_at: DateTime<Local>) -> SeriesWriter {
        SeriesWriter::new(self.storage.series_dir.clone(), run_at)
    }
}

impl ProbeConfig {
    /// probe 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// 종목 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

/// 필수 값 조회 (없거나 비어 있으면 에러)
fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CollectorError::Config(format!(
            "{} 환경변수가 설정되지 않았습니다",
            key
        ))),
    }
}

/// 값을 파싱 (실패 시 기본값 사용)
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::from_lookup(lookup_from(&[
            ("NOTION_API_TOKEN", "secret"),
            ("DATABASE_ID", "db-1"),
        ]))
        .unwrap();

        assert_eq!(config.notion.database_id, "db-1");
        assert_eq!(config.notion.base_url, "https://api.notion.com");
        assert_eq!(config.notion.version, "2022-06-28");
        assert_eq!(config.schema, RowSchema::default());
        assert_eq!(config.storage.snapshot_path, PathBuf::from("portfolio.json"));
        assert_eq!(config.storage.series_dir, PathBuf::from("data"));
        assert_eq!(config.probe.fine, ProbeWindow::fine());
        assert_eq!(config.probe.coarse, ProbeWindow::coarse());
        assert!(config.probe.timeout().is_none());
        assert_eq!(config.daemon.interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_missing_or_empty_database_id_fails() {
        let missing = CollectorConfig::from_lookup(lookup_from(&[("NOTION_API_TOKEN", "secret")]));
        assert!(matches!(missing, Err(CollectorError::Config(_))));

        let empty = CollectorConfig::from_lookup(lookup_from(&[
            ("NOTION_API_TOKEN", "secret"),
            ("DATABASE_ID", ""),
        ]));
        assert!(matches!(empty, Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_missing_token_fails() {
        let result = CollectorConfig::from_lookup(lookup_from(&[("DATABASE_ID", "db-1")]));
        assert!(matches!(result, Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_overrides_and_malformed_numbers() {
        let config = CollectorConfig::from_lookup(lookup_from(&[
            ("NOTION_API_TOKEN", "secret"),
            ("DATABASE_ID", "db-1"),
            ("TICKER_PROPERTY", "Symbol"),
            ("PROBE_FINE_INTERVAL", "5m"),
            ("PROBE_COARSE_RANGE", "5y"),
            ("PROBE_TIMEOUT_SECS", "15"),
            ("PROBE_REQUEST_DELAY_MS", "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(config.schema.ticker_property, "Symbol");
        assert_eq!(config.schema.status_property, "is_active");
        assert_eq!(config.probe.fine.interval, "5m");
        assert_eq!(config.probe.fine.range, "7d");
        assert_eq!(config.probe.coarse.range, "5y");
        assert_eq!(config.probe.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.probe.request_delay_ms, 0);
    }

    #[test]
    fn test_daemon_interval_is_never_zero() {
        let config = CollectorConfig::from_lookup(lookup_from(&[
            ("NOTION_API_TOKEN", "secret"),
            ("DATABASE_ID", "db-1"),
            ("DAEMON_INTERVAL_MINUTES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.daemon.interval_minutes, 1);
        assert_eq!(config.daemon.interval(), Duration::from_secs(60));

        let huge = DaemonConfig {
            interval_minutes: u64::MAX,
        };
        assert_eq!(huge.interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_notion_config_carries_settings() {
        let config = CollectorConfig::from_lookup(lookup_from(&[
            ("NOTION_API_TOKEN", "secret"),
            ("DATABASE_ID", "db-1"),
            ("NOTION_BASE_URL", "http://localhost:9000"),
            ("STATUS_PROPERTY", "Active"),
        ]))
        .unwrap();

        let notion = config.notion_config();
        assert_eq!(notion.database_id, "db-1");
        assert_eq!(notion.base_url, "http://localhost:9000");
        assert_eq!(notion.schema.status_property, "Active");
        assert_eq!(notion.api_token.expose_secret(), "secret");
    }
}
