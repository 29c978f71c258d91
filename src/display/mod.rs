//! Display formatting for terminal output
//!
//! List views are rendered with `tabled`; detail views are plain aligned
//! text.

pub mod agreement;
pub mod company;
pub mod contract;

pub use agreement::{format_agreement_detail, format_agreement_list};
pub use company::{format_company_details, format_company_list};
pub use contract::{format_amendment_list, format_contract_list, format_payment_list};

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a table, or `empty` when there are none
pub(crate) fn table<T: Tabled>(rows: Vec<T>, empty: &str) -> String {
    if rows.is_empty() {
        return empty.to_string();
    }
    Table::new(rows).with(Style::psql()).to_string()
}

pub(crate) fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}
