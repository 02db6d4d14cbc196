//! Aggregate views over the stored transactions.
//!
//! - `/summary` totals income and expenses, optionally filtered by date and category
//! - `/reports/monthly-category` totals amounts per category, optionally for one month

mod category_report;
mod summary;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use category_report::get_monthly_category_report;
pub use summary::get_summary;
#[cfg(test)]
pub use summary::{Summary, SummaryResponse};

/// The state needed by the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
