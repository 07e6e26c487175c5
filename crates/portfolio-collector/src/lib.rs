//! Portfolio status collector.
//!
//! 이 crate는 원격 포트폴리오 DB와 로컬 스냅샷을 맞추는 바이너리를 제공합니다:
//! - 원격 DB 전체 조회 및 스냅샷 저장
//! - 종목별 시세 probe 및 활성 상태 반영 (로컬 + 원격)
//! - 저장된 스냅샷 조회

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::{ReconcileStats, SyncStats};
