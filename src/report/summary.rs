//! Income and expense totals over a filtered set of transactions.

use axum::{Json, extract::State};
use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    date_format::{DATE_FORMAT, parse_date},
    extract::QueryParams,
    report::ReportState,
};

/// The query string for `/summary`, e.g. `?fromDate=2024-01-01&toDate=2024-01-31&category=rent`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// The earliest date to include, formatted as YYYY-MM-DD.
    pub from_date: Option<String>,
    /// The latest date to include, formatted as YYYY-MM-DD.
    pub to_date: Option<String>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
}

/// A validated [SummaryQuery]. Every bound is inclusive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SummaryFilter {
    /// The earliest date to include.
    pub from_date: Option<Date>,
    /// The latest date to include.
    pub to_date: Option<Date>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
}

impl SummaryQuery {
    /// Parse the dates in the query.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilter] if a date is malformed or `fromDate` is after `toDate`.
    pub fn validate(self) -> Result<SummaryFilter, Error> {
        let from_date = self.from_date.as_deref().map(parse_filter_date).transpose()?;
        let to_date = self.to_date.as_deref().map(parse_filter_date).transpose()?;

        if let (Some(from_date), Some(to_date)) = (from_date, to_date) {
            if from_date > to_date {
                return Err(Error::InvalidFilter(format!(
                    "fromDate {from_date} is after toDate {to_date}"
                )));
            }
        }

        Ok(SummaryFilter {
            from_date,
            to_date,
            category: self.category,
        })
    }
}

fn parse_filter_date(text: &str) -> Result<Date, Error> {
    parse_date(text).map_err(|_| {
        Error::InvalidFilter(format!("dates must be formatted as YYYY-MM-DD, got {text:?}"))
    })
}

/// The totals for a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of the income amounts.
    pub total_income: f64,
    /// The sum of the expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub balance: f64,
}

/// The response body for `/summary`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// The totals for the filtered transactions.
    pub summary: Summary,
}

/// A route handler for summarizing income and expenses.
pub async fn get_summary(
    State(state): State<ReportState>,
    QueryParams(query): QueryParams<SummaryQuery>,
) -> Result<Json<SummaryResponse>, Error> {
    let filter = query.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = summarize(&filter, &connection)?;

    Ok(Json(SummaryResponse { summary }))
}

/// Total the income and expenses of the transactions matching `filter`.
///
/// Totals are zero when no transactions match.
///
/// # Errors
/// This function will return a:
/// - [Error::NonFiniteTotal] if a total overflows,
/// - or [Error::SqlError] there is some SQL error.
pub fn summarize(filter: &SummaryFilter, connection: &Connection) -> Result<Summary, Error> {
    let mut query_string = "SELECT
            COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0.0),
            COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0.0)
        FROM transactions"
        .to_owned();
    let mut where_clause_parts = vec![];
    let mut query_parameters = vec![];

    if let Some(from_date) = filter.from_date {
        query_parameters.push(Value::Text(format_date(from_date)?));
        where_clause_parts.push(format!("date >= ?{}", query_parameters.len()));
    }

    if let Some(to_date) = filter.to_date {
        query_parameters.push(Value::Text(format_date(to_date)?));
        where_clause_parts.push(format!("date <= ?{}", query_parameters.len()));
    }

    if let Some(category) = &filter.category {
        query_parameters.push(Value::Text(category.clone()));
        where_clause_parts.push(format!("category = ?{}", query_parameters.len()));
    }

    if !where_clause_parts.is_empty() {
        query_string.push_str(" WHERE ");
        query_string.push_str(&where_clause_parts.join(" AND "));
    }

    let (total_income, total_expense): (f64, f64) = connection.query_row(
        &query_string,
        params_from_iter(query_parameters.iter()),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    if !total_income.is_finite() {
        return Err(Error::NonFiniteTotal("income".to_owned()));
    }

    if !total_expense.is_finite() {
        return Err(Error::NonFiniteTotal("expenses".to_owned()));
    }

    Ok(Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    })
}

fn format_date(date: Date) -> Result<String, Error> {
    date.format(DATE_FORMAT)
        .map_err(|error| Error::InvalidFilter(error.to_string()))
}
