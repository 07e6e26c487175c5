//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 전송 오류 (연결 실패, 타임아웃 등)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 원격 DB가 성공이 아닌 상태 코드를 반환
    #[error("Remote status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// 원격 응답 형식이 기대와 다름
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 데이터 가져오기 오류 (외부 시세 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
