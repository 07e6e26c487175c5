//! probe 결과 시계열 CSV 저장.
//!
//! 파일 이름: `{YYYYmmdd-HHMMSS}_{ticker}_{label}.csv`
//! 타임스탬프는 한 번의 실행 전체에서 공유됩니다.

use crate::error::Result;
use crate::provider::yahoo::Bar;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 시계열 파일 작성기.
#[derive(Debug, Clone)]
pub struct SeriesWriter {
    dir: PathBuf,
    stamp: String,
}

impl SeriesWriter {
    /// 실행 시각을 고정한 작성기 생성.
    pub fn new(dir: impl Into<PathBuf>, run_at: DateTime<Local>) -> Self {
        Self {
            dir: dir.into(),
            stamp: run_at.format("%Y%m%d-%H%M%S").to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// 티커/라벨에 해당하는 파일 경로
    pub fn path_for(&self, ticker: &str, label: &str) -> PathBuf {
        let safe_ticker: String = ticker
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir
            .join(format!("{}_{}_{}.csv", self.stamp, safe_ticker, label))
    }

    /// CSV 파일로 저장
    pub fn write(&self, ticker: &str, label: &str, bars: &[Bar]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(ticker, label);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "datetime,open,high,low,close,adj_close,volume")?;

        for bar in bars {
            writeln!(
                writer,
                "{},{},{},{},{},{},{}",
                bar.time.to_rfc3339(),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.adj_close,
                bar.volume
            )?;
        }

        writer.flush()?;

        info!(path = %path.display(), bars = bars.len(), "Saved series");
        Ok(path)
    }
}
