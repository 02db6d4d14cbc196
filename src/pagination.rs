//! This modules defines the common functionality for paging data.

use serde::Deserialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum number of items per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// The query parameters a client uses to request a page, e.g. `?page=2&limit=20`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of items per page.
    pub limit: Option<u64>,
}

/// A window of rows ready to be used in a `LIMIT ... OFFSET ...` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The maximum number of rows to return.
    pub limit: i64,
    /// The number of rows to skip.
    pub offset: i64,
}

impl PageQuery {
    /// Fill in missing values from `config` and compute the row offset as
    /// `(page - 1) * limit`.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] if the page or limit is zero, or if the
    /// window does not fit in a SQLite integer.
    pub fn resolve(&self, config: &PaginationConfig) -> Result<Page, Error> {
        let page = self.page.unwrap_or(config.default_page);
        let limit = self.limit.unwrap_or(config.default_page_size);

        if page == 0 {
            return Err(Error::InvalidRequest("page must be at least 1".to_owned()));
        }

        if limit == 0 {
            return Err(Error::InvalidRequest("limit must be at least 1".to_owned()));
        }

        let too_large = || Error::InvalidRequest("page or limit is too large".to_owned());
        let offset = (page - 1).checked_mul(limit).ok_or_else(too_large)?;

        Ok(Page {
            limit: i64::try_from(limit).map_err(|_| too_large())?,
            offset: i64::try_from(offset).map_err(|_| too_large())?,
        })
    }
}
