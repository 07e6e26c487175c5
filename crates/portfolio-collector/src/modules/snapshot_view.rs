//! 저장된 스냅샷 조회 기능.

use anyhow::{Context, Result};
use portfolio_data::{ActiveStatus, Row, Snapshot, SnapshotStore};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// 스냅샷 조회 설정.
#[derive(Debug)]
pub struct ViewConfig {
    /// 스냅샷 파일 경로
    pub path: PathBuf,
    /// 출력 형식
    pub format: OutputFormat,
    /// 출력 파일 경로
    pub output: Option<PathBuf>,
}

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// 스냅샷 출력. 출력한 Row 수를 반환합니다.
pub fn view_snapshot(config: &ViewConfig) -> Result<usize> {
    let stored = SnapshotStore::new(&config.path)
        .load_stored()
        .with_context(|| format!("Failed to load snapshot: {}", config.path.display()))?;

    let rows = &stored.snapshot.rows;

    let mut content = match config.format {
        OutputFormat::Table => format_table(&stored.snapshot),
        OutputFormat::Csv => format_csv(rows),
        OutputFormat::Json => format_json(rows)?,
    };

    if config.format == OutputFormat::Table {
        if let Some(saved_at) = stored.saved_at {
            content.push_str(&format!("\nSaved at: {}", saved_at.to_rfc3339()));
        }
    }

    write_output(&content, config.output.as_deref())?;
    Ok(rows.len())
}

/// 파일 또는 stdout에 출력.
fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn status_label(status: ActiveStatus) -> &'static str {
    status.as_select_name().unwrap_or("-")
}

/// 모든 Row에 등장하는 속성 이름 (이름순).
fn property_columns(rows: &[Row]) -> Vec<&str> {
    rows.iter()
        .flat_map(|row| row.properties.keys().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 테이블 형식 출력.
fn format_table(snapshot: &Snapshot) -> String {
    let rows = &snapshot.rows;
    let mut output = String::new();

    output.push_str(&format!(
        "{:<36} {:<12} {:<8} {}\n",
        "ID", "TICKER", "ACTIVE", "PROPERTIES"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');

    for row in rows {
        let props = row
            .properties
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ");

        output.push_str(&format!(
            "{:<36} {:<12} {:<8} {}\n",
            truncate(&row.id, 36),
            truncate(row.ticker_symbol.as_deref().unwrap_or("-"), 12),
            status_label(row.is_active),
            truncate(&props, 60)
        ));
    }

    let (active, inactive, unset) = snapshot.status_counts();

    output.push('\n');
    output.push_str(&format!(
        "Total: {} rows (active: {}, inactive: {}, unset: {})",
        rows.len(),
        active,
        inactive,
        unset
    ));

    output
}

/// CSV 형식 출력.
fn format_csv(rows: &[Row]) -> String {
    let columns = property_columns(rows);
    let mut output = String::new();

    let mut header = vec!["id", "ticker_symbol", "is_active"];
    header.extend(columns.iter().copied());
    output.push_str(
        &header
            .iter()
            .map(|name| escape_csv(name))
            .collect::<Vec<_>>()
            .join(","),
    );
    output.push('\n');

    for row in rows {
        let mut fields = vec![
            escape_csv(&row.id),
            escape_csv(row.ticker_symbol.as_deref().unwrap_or("")),
            row.is_active.as_select_name().unwrap_or("").to_string(),
        ];
        for column in &columns {
            let value = row
                .properties
                .get(*column)
                .map(|v| v.to_string())
                .unwrap_or_default();
            fields.push(escape_csv(&value));
        }
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

/// JSON 형식 출력.
fn format_json(rows: &[Row]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to serialize to JSON")
}

/// 문자열 자르기 (UTF-8 안전).
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// CSV 이스케이프 (콤마나 따옴표 포함 시 따옴표로 감싸기).
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
