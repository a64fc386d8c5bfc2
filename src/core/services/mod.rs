//! Stateless operations over a [`DesireStore`](crate::desire::DesireStore).

pub mod desire_service;
pub mod report_service;
pub mod summary_service;

pub use desire_service::DesireService;
pub use report_service::ReportService;
pub use summary_service::{Statistics, SummaryService};
