//! OSTI.gov records search client
//!
//! - `client` - [`OstiClient`]: single-page queries and opt-in pagination
//! - `query` - query parameters, publication date window, [`RecordQuery`] builder
//! - `responses` - [`QueryResult`] page wrapper
//! - `links` - citation URL extraction from record link relations

pub mod client;
pub mod links;
pub mod query;
pub mod responses;

// Re-export public types
pub use client::{OstiClient, TOTAL_COUNT_HEADER};
pub use links::{
    extract_citation_url, find_citation_url, record_citation_url, record_links, LinkRelation,
    CITATION_REL,
};
pub use query::{
    default_start_date, format_date, parse_date, DateRange, QueryParameters, RecordQuery,
};
pub use responses::{QueryResult, ROWS_PER_PAGE};
