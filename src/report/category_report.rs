//! Amounts per category, for all time or for a single month.

use axum::{Json, extract::State};
use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, date_format::DATE_FORMAT, extract::QueryParams, report::ReportState};

/// The query string for `/reports/monthly-category`, e.g. `?month=2024-01`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryReportQuery {
    /// Restrict the report to this calendar month, formatted as YYYY-MM.
    pub month: Option<String>,
}

/// The total amount for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category the amounts were summed for.
    pub category: String,
    /// The sum of the amounts in the category.
    pub total_spent: f64,
}

/// The response body for `/reports/monthly-category`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyCategoryReport {
    /// One row per category, ordered by category.
    pub monthly_spending: Vec<CategoryTotal>,
}

/// A route handler for the per-category report.
pub async fn get_monthly_category_report(
    State(state): State<ReportState>,
    QueryParams(query): QueryParams<CategoryReportQuery>,
) -> Result<Json<MonthlyCategoryReport>, Error> {
    let month = query.month.as_deref().map(parse_month).transpose()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let monthly_spending = get_category_totals(month, &connection)?;

    Ok(Json(MonthlyCategoryReport { monthly_spending }))
}

/// Parse text like "2024-01" into the first and last day of that month.
fn parse_month(text: &str) -> Result<(Date, Date), Error> {
    let invalid = || Error::InvalidFilter(format!("month must be formatted as YYYY-MM, got {text:?}"));

    let (year, month) = text.split_once('-').ok_or_else(invalid)?;
    let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if year.len() != 4 || month.len() != 2 || !is_digits(year) || !is_digits(month) {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    if year < 1 {
        return Err(invalid());
    }
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    let first_day = Date::from_calendar_date(year, month, 1).map_err(|_| invalid())?;
    let last_day = Date::from_calendar_date(year, month, month.length(year)).map_err(|_| invalid())?;

    Ok((first_day, last_day))
}

/// Sum the amounts of the transactions in each category, ordered by category.
///
/// When `month` is given only transactions dated within those inclusive bounds are counted.
///
/// # Errors
/// This function will return a:
/// - [Error::NonFiniteTotal] if the total for a category overflows,
/// - or [Error::SqlError] there is some SQL error.
pub fn get_category_totals(
    month: Option<(Date, Date)>,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    let mut query_string_parts = vec!["SELECT category, SUM(amount) FROM transactions".to_owned()];
    let mut query_parameters = vec![];

    if let Some((first_day, last_day)) = month {
        query_string_parts.push("WHERE date BETWEEN ?1 AND ?2".to_owned());
        for day in [first_day, last_day] {
            let text = day
                .format(DATE_FORMAT)
                .map_err(|error| Error::InvalidFilter(error.to_string()))?;
            query_parameters.push(Value::Text(text));
        }
    }

    query_string_parts.push("GROUP BY category ORDER BY category".to_owned());

    let query_string = query_string_parts.join(" ");

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total_spent: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<CategoryTotal>, rusqlite::Error>>()?
        .into_iter()
        .map(|total| {
            if total.total_spent.is_finite() {
                Ok(total)
            } else {
                Err(Error::NonFiniteTotal(format!("category {:?}", total.category)))
            }
        })
        .collect()
}
