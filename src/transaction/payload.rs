//! Validation of the transaction fields sent by clients.

use serde::Deserialize;

use crate::{
    Error,
    date_format::parse_date,
    transaction::{NewTransaction, TransactionType},
};

/// The largest amount a single transaction may have.
///
/// Sums over any realistic number of transactions stay finite below this.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// The JSON body for creating or replacing a transaction.
///
/// Every field is optional here so that a missing field is reported as a
/// validation error with a useful message instead of a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionPayload {
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// A free-text label, must not be empty.
    pub category: Option<String>,
    /// The non-negative amount of money, at most [MAX_AMOUNT].
    pub amount: Option<f64>,
    /// A date formatted as YYYY-MM-DD.
    pub date: Option<String>,
    /// An optional description, defaults to the empty string.
    pub description: Option<String>,
}

impl TransactionPayload {
    /// Check the payload and convert it into a [NewTransaction].
    ///
    /// # Errors
    /// Returns [Error::InvalidTransaction] naming the first field that is
    /// missing or invalid.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let transaction_type = self
            .transaction_type
            .ok_or_else(|| missing("type"))?
            .parse::<TransactionType>()
            .map_err(|error| Error::InvalidTransaction(error.to_string()))?;

        let category = self.category.ok_or_else(|| missing("category"))?;
        if category.trim().is_empty() {
            return Err(Error::InvalidTransaction(
                "category must not be empty".to_owned(),
            ));
        }

        let amount = self.amount.ok_or_else(|| missing("amount"))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidTransaction(format!(
                "amount must be a non-negative number, got {amount}"
            )));
        }

        if amount > MAX_AMOUNT {
            return Err(Error::InvalidTransaction(format!(
                "amount must be at most {MAX_AMOUNT}, got {amount}"
            )));
        }

        let date = self.date.ok_or_else(|| missing("date"))?;
        let date = parse_date(&date).map_err(|_| {
            Error::InvalidTransaction(format!("date must be formatted as YYYY-MM-DD, got {date:?}"))
        })?;

        Ok(NewTransaction {
            transaction_type,
            category,
            amount,
            date,
            description: self.description.unwrap_or_default(),
        })
    }
}

fn missing(field: &str) -> Error {
    Error::InvalidTransaction(format!("{field} is required"))
}
