//! PulseX token pair dashboard.
//!
//! Library interface for the `px-dashboard` binary and its integration tests.

pub mod export;
pub mod page;
pub mod panels;
pub mod server;
pub mod service;

pub use export::export_view;
pub use page::{render_page, PageMode};
pub use panels::ChartKind;
pub use server::{router, run_server};
pub use service::{DashboardService, DashboardView, ViewError};
