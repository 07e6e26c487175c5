//! 포트폴리오 데이터 접근.
//!
//! 이 crate는 다음을 제공합니다:
//! - 원격 DB(Notion) 페이지네이션 조회 및 속성 디코딩
//! - 종목별 상태 값 원격 갱신
//! - Yahoo Finance 시세 probe
//! - 로컬 스냅샷 및 시계열 파일 저장

pub mod error;
pub mod model;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use model::{ActiveStatus, CellValue, Row, RowSchema, Snapshot};

pub use provider::{
    Bar, FetchStats, MarketProbe, NotionClient, NotionConfig, ProbeWindow, StatusAck,
    StatusWriter, YahooProbe,
};
pub use storage::{SeriesWriter, SnapshotStore, StoredSnapshot};
