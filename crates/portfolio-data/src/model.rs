//! 포트폴리오 스냅샷 도메인 타입.
//!
//! 원격 DB의 레코드 한 건은 [`Row`] 한 건으로 복사되며,
//! [`Snapshot`]은 조회 순서를 그대로 유지하는 Row 목록입니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 디코딩된 속성 값.
///
/// JSON으로는 `null`, 불리언, 숫자, 문자열 그대로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    /// 문자열 값이면 참조 반환.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// 종목 활성 상태.
///
/// 원격 DB의 select 옵션 이름(`"True"` / `"False"`)과 동일한 문자열로 저장되며,
/// 아직 판정되지 않은 경우 `null`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ActiveStatus {
    #[default]
    Unset,
    True,
    False,
}

impl ActiveStatus {
    pub fn from_bool(active: bool) -> Self {
        if active {
            Self::True
        } else {
            Self::False
        }
    }

    /// select 옵션 이름에서 파싱 (그 외 값은 `Unset`)
    pub fn parse(s: &str) -> Self {
        match s {
            "True" => Self::True,
            "False" => Self::False,
            _ => Self::Unset,
        }
    }

    /// 원격 select 옵션 이름
    pub fn as_select_name(&self) -> Option<&'static str> {
        match self {
            Self::True => Some("True"),
            Self::False => Some("False"),
            Self::Unset => None,
        }
    }
}

impl From<Option<String>> for ActiveStatus {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::parse).unwrap_or_default()
    }
}

impl From<ActiveStatus> for Option<String> {
    fn from(status: ActiveStatus) -> Self {
        status.as_select_name().map(str::to_string)
    }
}

/// Row를 만들 때 특별 취급하는 원격 속성 이름.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    /// 티커 심볼이 들어있는 속성
    pub ticker_property: String,
    /// 활성 상태 select 속성
    pub status_property: String,
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            ticker_property: "TickerSymbol".to_string(),
            status_property: "is_active".to_string(),
        }
    }
}

/// 스냅샷의 종목 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 원격 레코드 ID (참조용, 소유 관계 아님)
    pub id: String,
    /// 티커 심볼 (probe에 필수)
    pub ticker_symbol: Option<String>,
    /// 활성 상태
    #[serde(default)]
    pub is_active: ActiveStatus,
    /// 나머지 디코딩된 속성 (이름순)
    #[serde(default)]
    pub properties: BTreeMap<String, CellValue>,
}

impl Row {
    /// 디코딩된 속성 맵으로 Row 생성.
    ///
    /// 티커와 상태 속성은 전용 필드로 옮기고 나머지는 그대로 보존합니다.
    pub fn from_decoded(
        id: impl Into<String>,
        mut properties: BTreeMap<String, CellValue>,
        schema: &RowSchema,
    ) -> Self {
        let ticker_symbol = match properties.remove(&schema.ticker_property) {
            Some(CellValue::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        };

        let is_active = properties
            .remove(&schema.status_property)
            .and_then(|v| v.as_text().map(ActiveStatus::parse))
            .unwrap_or_default();

        Self {
            id: id.into(),
            ticker_symbol,
            is_active,
            properties,
        }
    }
}

/// 로컬 스냅샷 (조회/파일 순서를 유지하는 Row 목록).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: Vec<Row>,
}

impl Snapshot {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// ID로 Row 조회 (선형 탐색)
    pub fn find(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// 상태별 개수 (True, False, Unset)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.rows
            .iter()
            .fold((0, 0, 0), |(t, f, u), row| match row.is_active {
                ActiveStatus::True => (t + 1, f, u),
                ActiveStatus::False => (t, f + 1, u),
                ActiveStatus::Unset => (t, f, u + 1),
            })
    }
}
