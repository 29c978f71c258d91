//! Reports
//!
//! The dashboard, the filtered agreement report and its PDF rendition.

pub mod agreements;
pub mod chart;
pub mod dashboard;
pub mod filter;
pub mod pdf;
pub mod report_pdf;
pub mod series;

pub use agreements::{AgreementReport, ReportRow, StatusCount, TypeCount};
pub use dashboard::{Dashboard, DashboardCards, LabeledSeries, TypeTotal, DASHBOARD_MONTHS};
pub use filter::{AgreementFilter, StatusFilter};
pub use report_pdf::{REPORT_FILENAME, REPORT_TITLE};
pub use series::{Month, MonthlyTransfer};
