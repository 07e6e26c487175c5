//! 데이터 Provider 모듈.
//!
//! ## 원격 DB (Notion API)
//! - `NotionClient`: 커서 기반 전체 조회, 상태 select 속성 갱신
//! - `property`: 타입별 속성 값 디코더
//!
//! ## 시세 probe
//! - `YahooProbe`: Yahoo Finance 간격/기간 조회

pub mod notion;
pub mod property;
pub mod yahoo;

pub use notion::{
    FetchStats, NotionClient, NotionConfig, QueryPage, RemoteRecord, StatusAck, StatusWriter,
};
pub use property::{decode_properties, decode_property, PropertyValue};
pub use yahoo::{Bar, MarketProbe, ProbeWindow, YahooProbe};
