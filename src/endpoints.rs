//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}', use `format_endpoint`.

/// The route for registering a new user.
pub const REGISTER: &str = "/register";
/// The route for logging in a user and getting a bearer token.
pub const LOG_IN: &str = "/login";
/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to get, replace and delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
/// The route for the income and expense totals.
pub const SUMMARY: &str = "/summary";
/// The route for the spending totals per category.
pub const MONTHLY_CATEGORY_REPORT: &str = "/reports/monthly-category";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/transactions/{transaction_id}', '{transaction_id}' is the
/// parameter.
///
/// This function assumes that an endpoint path contains at most one parameter.
/// If no parameter is found in `endpoint_path`, the function returns the original
/// `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
