//! 로컬 저장소.
//!
//! - `snapshot`: 포트폴리오 스냅샷 JSON (원자적 교체)
//! - `series`: probe 결과 시계열 CSV

pub mod series;
pub mod snapshot;

pub use series::SeriesWriter;
pub use snapshot::{SnapshotStore, StoredSnapshot};
