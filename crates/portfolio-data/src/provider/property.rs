//! 원격 DB 속성 디코더.
//!
//! 원격 DB의 속성 값은 `type` 판별자와 타입별 payload로 구성됩니다.
//! 이 모듈은 지원하는 타입 집합을 닫힌 enum으로 모델링하고,
//! 각 값을 [`CellValue`] 하나로 변환합니다.
//!
//! | type | 결과 |
//! |------|------|
//! | `title`, `rich_text` | 텍스트 조각 `content`를 구분자 없이 연결 |
//! | `select` | 옵션 이름 또는 null |
//! | `multi_select` | 옵션 이름을 `", "`로 연결 |
//! | `number`, `checkbox` | 원시 값 또는 null |
//! | `date` | 시작일 문자열만 |
//! | `email`, `phone_number`, `url`, `created_time`, `last_edited_time` | 원시 값 또는 null |
//! | 그 외 | null |
//!
//! 형식이 깨진 payload는 오류 없이 null로 처리합니다.

use crate::model::CellValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// 타입이 지정된 원격 속성 값.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichTextFragment>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextFragment>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Number {
        #[serde(default)]
        number: Option<serde_json::Number>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: Option<bool>,
    },
    Date {
        #[serde(default)]
        date: Option<DateRange>,
    },
    Email {
        #[serde(default)]
        email: Option<String>,
    },
    PhoneNumber {
        #[serde(default)]
        phone_number: Option<String>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    CreatedTime {
        #[serde(default)]
        created_time: Option<String>,
    },
    LastEditedTime {
        #[serde(default)]
        last_edited_time: Option<String>,
    },
    /// 지원하지 않는 타입 (formula, relation, people 등)
    #[serde(other)]
    Unsupported,
}

/// 리치 텍스트 조각.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RichTextFragment {
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: Option<String>,
}

/// select / multi_select 옵션.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: Option<String>,
}

/// 날짜 범위 (시작일만 사용).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
}

impl PropertyValue {
    /// 단일 셀 값으로 변환.
    pub fn decode(self) -> CellValue {
        match self {
            Self::Title { title: fragments } | Self::RichText { rich_text: fragments } => {
                CellValue::Text(concat_fragments(&fragments))
            }
            Self::Select { select } => select
                .and_then(|option| option.name)
                .map(CellValue::Text)
                .unwrap_or_default(),
            Self::MultiSelect { multi_select } => CellValue::Text(
                multi_select
                    .into_iter()
                    .map(|option| option.name.unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Self::Number { number } => number.map(CellValue::Number).unwrap_or_default(),
            Self::Checkbox { checkbox } => checkbox.map(CellValue::Bool).unwrap_or_default(),
            Self::Date { date } => date
                .and_then(|range| range.start)
                .map(CellValue::Text)
                .unwrap_or_default(),
            Self::Email { email: value }
            | Self::PhoneNumber {
                phone_number: value,
            }
            | Self::Url { url: value }
            | Self::CreatedTime {
                created_time: value,
            }
            | Self::LastEditedTime {
                last_edited_time: value,
            } => value.map(CellValue::Text).unwrap_or_default(),
            Self::Unsupported => CellValue::Null,
        }
    }
}

fn concat_fragments(fragments: &[RichTextFragment]) -> String {
    fragments
        .iter()
        .filter_map(|f| f.text.as_ref().and_then(|t| t.content.as_deref()))
        .collect()
}

/// 원시 JSON 속성 하나를 디코딩.
pub fn decode_property(raw: &serde_json::Value) -> CellValue {
    if raw.is_null() {
        return CellValue::Null;
    }

    match PropertyValue::deserialize(raw) {
        Ok(value) => value.decode(),
        Err(e) => {
            debug!(error = %e, "Malformed property payload, decoding as null");
            CellValue::Null
        }
    }
}

/// 레코드의 `properties` 맵 전체를 디코딩.
pub fn decode_properties(
    properties: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, CellValue> {
    properties
        .iter()
        .map(|(name, raw)| (name.clone(), decode_property(raw)))
        .collect()
}
