//! 로컬 스냅샷 저장소.
//!
//! 스냅샷은 JSON 파일 하나로 저장되며, 저장할 때마다 임시 파일에 쓴 뒤
//! rename으로 기존 파일을 통째로 교체합니다.

use crate::error::Result;
use crate::model::{Row, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Serialize)]
struct SnapshotFileOut<'a> {
    saved_at: DateTime<Utc>,
    rows: &'a [Row],
}

#[derive(Deserialize)]
struct SnapshotFileIn {
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    rows: Vec<Row>,
}

/// 저장된 스냅샷과 저장 시각.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub saved_at: Option<DateTime<Utc>>,
    pub snapshot: Snapshot,
}

/// 스냅샷 파일 저장소.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp: OsString = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    /// 스냅샷 로드.
    pub fn load(&self) -> Result<Snapshot> {
        Ok(self.load_stored()?.snapshot)
    }

    /// 저장 시각과 함께 로드.
    pub fn load_stored(&self) -> Result<StoredSnapshot> {
        let file = File::open(&self.path)?;
        let parsed: SnapshotFileIn = serde_json::from_reader(BufReader::new(file))?;

        debug!(path = %self.path.display(), rows = parsed.rows.len(), "Snapshot loaded");

        Ok(StoredSnapshot {
            saved_at: parsed.saved_at,
            snapshot: Snapshot::new(parsed.rows),
        })
    }

    /// 스냅샷 저장 (기존 파일을 원자적으로 교체).
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.tmp_path();
        if let Err(e) = write_then_rename(&tmp, &self.path, snapshot) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!(path = %tmp.display(), error = %cleanup, "Temp snapshot not removed");
            }
            return Err(e);
        }

        info!(path = %self.path.display(), rows = snapshot.len(), "Snapshot saved");
        Ok(())
    }
}

/// 임시 파일에 기록하고 fsync 후 대상 경로로 rename.
fn write_then_rename(tmp: &Path, path: &Path, snapshot: &Snapshot) -> Result<()> {
    {
        let file = File::create(tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(
            &mut writer,
            &SnapshotFileOut {
                saved_at: Utc::now(),
                rows: &snapshot.rows,
            },
        )?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(tmp, path)?;
    Ok(())
}
