//! 수집 통계 구조체.

use portfolio_data::FetchStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 원격 DB 동기화 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// 요청한 페이지 수
    pub pages: usize,
    /// 받은 레코드 수
    pub records: usize,
    /// 스냅샷에 저장된 Row 수
    pub rows: usize,
    /// 건너뛴 레코드 수 (ID 없음)
    pub skipped: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    pub fn from_fetch(fetch: &FetchStats, rows: usize) -> Self {
        Self {
            pages: fetch.pages,
            records: fetch.records,
            rows,
            skipped: fetch.skipped,
            elapsed: Duration::default(),
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            pages = self.pages,
            records = self.records,
            rows = self.rows,
            skipped = self.skipped,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}

/// probe 및 상태 반영 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileStats {
    /// 처리한 Row 수
    pub total: usize,
    /// 활성 판정 수
    pub active: usize,
    /// 비활성 판정 수
    pub inactive: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// probe 에러 수
    pub errors: usize,
    /// 원격 상태 쓰기 실패 수
    pub write_failures: usize,
    /// 저장한 시계열 파일 수
    pub series_files: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ReconcileStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성 비율 계산 (%)
    pub fn active_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.active as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            active = self.active,
            inactive = self.inactive,
            empty = self.empty,
            errors = self.errors,
            write_failures = self.write_failures,
            series_files = self.series_files,
            active_rate = format!("{:.1}%", self.active_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "상태 반영 완료"
        );
    }
}
