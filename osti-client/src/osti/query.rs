//! Query parameters and the [`RecordQuery`] builder
//!
//! A [`RecordQuery`] owns its parameters. Building the request parameters
//! always works on a fresh copy, so the same query (or the default one) can
//! be reused across calls with different date ranges without one call's
//! dates leaking into the next.

use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{OstiError, Result};

/// Default sort order of the search
pub const DEFAULT_SORT: &str = "publication_date desc";

/// Default sponsoring organization filter, quoted for exact match
pub const DEFAULT_SPONSOR_ORG: &str = "\"EE-4S\"";

/// Date format used by the OSTI API
pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub const PUBLICATION_DATE_START: &str = "publication_date_start";
pub const PUBLICATION_DATE_END: &str = "publication_date_end";
pub const PAGE: &str = "page";

const SORT: &str = "sort";
const SPONSOR_ORG: &str = "sponsor_org";

/// API filter and sort options, keyed by OSTI parameter name
///
/// Iteration and encoding follow key order.
///
/// # Example
///
/// ```
/// use osti_client::osti::QueryParameters;
///
/// let params = QueryParameters::new().with("title", "wind turbine");
/// assert_eq!(params.get("sort"), Some("publication_date desc"));
/// assert_eq!(params.get("sponsor_org"), Some("\"EE-4S\""));
/// assert_eq!(params.get("title"), Some("wind turbine"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParameters {
    params: BTreeMap<String, String>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self::empty()
            .with(SORT, DEFAULT_SORT)
            .with(SPONSOR_ORG, DEFAULT_SPONSOR_ORG)
    }
}

impl QueryParameters {
    /// Parameters with the default sort and sponsor filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters with nothing set
    pub fn empty() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.params.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Set the sort order, e.g. `"publication_date asc"`
    pub fn with_sort<S: Into<String>>(self, sort: S) -> Self {
        self.with(SORT, sort)
    }

    /// Filter by sponsoring organization
    ///
    /// The value is wrapped in double quotes for an exact match unless it is
    /// already quoted.
    pub fn with_sponsor_org(self, org: &str) -> Self {
        let org = org.trim();
        let quoted = if org.len() >= 2 && org.starts_with('"') && org.ends_with('"') {
            org.to_string()
        } else {
            format!("\"{}\"", org)
        };
        self.with(SPONSOR_ORG, quoted)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// URL-encoded `key=value&...` string
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for QueryParameters {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<'a> IntoIterator for &'a QueryParameters {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Parse a `MM/DD/YYYY` date
///
/// # Errors
///
/// * `OstiError::InvalidDate` - the string is not a valid `MM/DD/YYYY` date
///
/// # Example
///
/// ```
/// use osti_client::osti::parse_date;
///
/// let date = parse_date("02/29/2024").unwrap();
/// assert_eq!(date.to_string(), "2024-02-29");
/// assert!(parse_date("2024-02-29").is_err());
/// ```
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| OstiError::InvalidDate {
        value: value.to_string(),
    })
}

/// Format a date as `MM/DD/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Earliest publication date searched by default (01/01/1980)
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1980, 1, 1).unwrap_or_default()
}

/// Publication date window of a query
///
/// An open `end` means "today", resolved each time parameters are built
/// rather than once when the range is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: default_start_date(),
            end: None,
        }
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Range from `start` up to today
    pub fn since(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Parse a range from `MM/DD/YYYY` strings; `None` bounds keep their
    /// defaults
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = match start {
            Some(s) => parse_date(s)?,
            None => default_start_date(),
        };
        let end = end.map(parse_date).transpose()?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The end date, with an open end resolved to today's local date
    pub fn end(&self) -> NaiveDate {
        self.end.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}

/// A single-page query against the records endpoint
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use osti_client::osti::{DateRange, RecordQuery};
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
/// );
/// let query = RecordQuery::new().date_range(range).param("title", "solar");
///
/// let params = query.build_params().unwrap();
/// assert_eq!(params.get("publication_date_start"), Some("01/01/2020"));
/// assert_eq!(params.get("publication_date_end"), Some("12/31/2020"));
///
/// // The query itself is left untouched
/// assert_eq!(query.parameters().get("publication_date_start"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    endpoint: Option<String>,
    params: QueryParameters,
    date_range: DateRange,
    verbose: bool,
}

impl RecordQuery {
    /// Query with default parameters and date range
    pub fn new() -> Self {
        Self::default()
    }

    /// Send this query to another endpoint than the client's
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Replace all parameters
    pub fn params(mut self, params: QueryParameters) -> Self {
        self.params = params;
        self
    }

    pub fn param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn sort<S: Into<String>>(mut self, sort: S) -> Self {
        self.params = self.params.with_sort(sort);
        self
    }

    pub fn sponsor_org(mut self, org: &str) -> Self {
        self.params = self.params.with_sponsor_org(org);
        self
    }

    pub fn date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn start_date(mut self, start: NaiveDate) -> Self {
        self.date_range.start = start;
        self
    }

    pub fn end_date(mut self, end: NaiveDate) -> Self {
        self.date_range.end = Some(end);
        self
    }

    /// Print a status summary to stdout after each request
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn endpoint_override(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn parameters(&self) -> &QueryParameters {
        &self.params
    }

    pub fn get_date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Request parameters for one call: a copy of the query's parameters
    /// with the publication date window filled in
    ///
    /// # Errors
    ///
    /// * `OstiError::InvalidParameter` - the start date is after the end date
    pub fn build_params(&self) -> Result<QueryParameters> {
        let start = self.date_range.start();
        let end = self.date_range.end();
        if start > end {
            return Err(OstiError::InvalidParameter(format!(
                "start date {} is after end date {}",
                format_date(start),
                format_date(end)
            )));
        }

        let mut params = self.params.clone();
        params.set(PUBLICATION_DATE_START, format_date(start));
        params.set(PUBLICATION_DATE_END, format_date(end));
        Ok(params)
    }

    /// Copy of this query requesting the given 1-based page
    pub(crate) fn for_page(&self, page: u32) -> Self {
        self.clone().param(PAGE, page.to_string())
    }
}
