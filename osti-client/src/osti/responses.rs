use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OstiError, Result};
use crate::osti::links::record_citation_url;

/// Records returned per request; the API paginates server-side
pub const ROWS_PER_PAGE: u64 = 20;

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Decoded records of this page, in server order
    pub records: Vec<Value>,
    /// Number of records matching the query across all pages
    pub total_count: u64,
    /// HTTP status code of the response
    pub status: u16,
    /// Server `Date` header, if present
    pub request_date: Option<String>,
    /// Fully resolved request URL
    pub url: String,
}

impl QueryResult {
    /// Whether the server answered `200 OK`
    ///
    /// Other 2xx codes (`204`, `206`) report false.
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }

    /// Number of pages needed to retrieve all `total_count` records
    pub fn page_count(&self) -> u64 {
        self.total_count.div_ceil(ROWS_PER_PAGE)
    }

    /// Human-readable status summary printed in verbose mode
    pub fn status_report(&self) -> String {
        format!(
            "Query was successful: {}\n\nQuery made on {} returned {} hits\n\nURL used was {}",
            if self.is_success() { "True" } else { "False" },
            self.request_date.as_deref().unwrap_or("an unknown date"),
            self.total_count,
            self.url
        )
    }

    /// Turn a non-success status into `OstiError::ApiError`
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string();
        Err(OstiError::ApiError {
            status: self.status,
            message,
        })
    }

    /// Citation URL of every record, in record order
    ///
    /// Records whose links carry no citation entry map to `None`.
    pub fn citation_urls(&self) -> Result<Vec<Option<String>>> {
        self.records.iter().map(record_citation_url).collect()
    }
}
