//! 워크플로우 모듈.

pub mod portfolio_sync;
pub mod snapshot_view;
pub mod status_probe;
pub mod workflow;

pub use portfolio_sync::sync_portfolio;
pub use snapshot_view::{view_snapshot, OutputFormat, ViewConfig};
pub use status_probe::{probe_portfolio, reconcile};
pub use workflow::run_all;
