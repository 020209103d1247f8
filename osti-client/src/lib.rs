//! # OSTI Client
//!
//! A Rust client for the [OSTI.gov](https://www.osti.gov) records search API
//! of the U.S. Department of Energy.
//!
//! ## Features
//!
//! - **Record search**: one-page queries filtered by sponsor and publication date
//! - **Pagination**: opt-in retrieval of every matching record
//! - **Citation links**: extract the landing-page URL of each record
//! - **Resilience**: request timeout, rate limiting and retry with backoff
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use osti_client::{OstiClient, RecordQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OstiClient::new();
//!
//!     let query = RecordQuery::new()
//!         .sponsor_org("EE-4S")
//!         .start_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
//!
//!     let page = client.query_records(&query).await?;
//!     println!("{} records match, {} pages", page.total_count, page.page_count());
//!
//!     for url in page.citation_urls()?.into_iter().flatten() {
//!         println!("{}", url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod osti;
pub mod rate_limit;
pub mod retry;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{OstiError, Result};
pub use osti::{
    extract_citation_url, find_citation_url, DateRange, LinkRelation, OstiClient,
    QueryParameters, QueryResult, RecordQuery,
};
pub use retry::RetryConfig;
