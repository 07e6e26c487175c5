//! 에러 타입 정의.

use portfolio_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터 계층 에러 (원격 DB, 스냅샷 파일 등)
    #[error(transparent)]
    Data(#[from] DataError),

    /// 원격 DB 전체 조회 중단
    #[error("Remote database sync aborted after {pages} page(s)")]
    SyncAborted { pages: usize },

    /// 파일 입출력 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
