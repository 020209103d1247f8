use std::io::Write;

use reqwest::header::{HeaderMap, DATE};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{OstiError, Result};
use crate::osti::query::{QueryParameters, RecordQuery};
use crate::osti::responses::QueryResult;
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryConfig};

/// Response header carrying the full match count
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Client for the OSTI.gov records search API
#[derive(Clone)]
pub struct OstiClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl OstiClient {
    /// Create a new client with default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use osti_client::OstiClient;
    ///
    /// let client = OstiClient::new();
    /// assert_eq!(client.base_url(), "https://www.osti.gov/api/v1/records");
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new client with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (no TLS backend available).
    /// Use [`OstiClient::try_with_config`] to handle that case.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use osti_client::{ClientConfig, OstiClient};
    ///
    /// let config = ClientConfig::new().with_timeout(Duration::from_secs(10));
    /// let client = OstiClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let client = build_http_client(&config).expect("Failed to create HTTP client");
        Self::from_parts(client, config)
    }

    /// Create a new client with custom configuration
    ///
    /// Unlike [`OstiClient::with_config`], an unusable rate limit is an
    /// error here instead of falling back to the default.
    ///
    /// # Errors
    ///
    /// * `OstiError::InvalidParameter` - the rate limit is not a finite
    ///   number above zero
    /// * `OstiError::RequestError` - the HTTP client could not be built
    pub fn try_with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = build_http_client(&config)?;

        Ok(Self::from_parts(client, config))
    }

    /// Create a new client around a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self::from_parts(client, ClientConfig::new())
    }

    fn from_parts(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch one page of records
    ///
    /// Sends a single GET request with the query's parameters plus its
    /// publication date window. The returned [`QueryResult`] holds at most
    /// one page (20 records) and the server's total match count; fetching
    /// the remaining pages is left to the caller (see
    /// [`OstiClient::query_page`] and [`OstiClient::query_all_records`]).
    ///
    /// A non-success HTTP status is not an error: the records received (if
    /// any) are returned and [`QueryResult::is_success`] is false. Call
    /// [`QueryResult::error_for_status`] to treat it as one.
    ///
    /// # Errors
    ///
    /// * `OstiError::RequestError` - the request could not be completed,
    ///   after retrying transport failures per the client's retry policy
    /// * `OstiError::TotalCountMissing` / `OstiError::TotalCountInvalid` -
    ///   the `X-Total-Count` header is absent or not a number
    /// * `OstiError::JsonError` - a successful response body is not a JSON
    ///   array
    /// * `OstiError::InvalidParameter` - bad endpoint or date window
    ///
    /// # Example
    ///
    /// ```no_run
    /// use osti_client::{OstiClient, RecordQuery};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = OstiClient::new();
    ///     let result = client.query_records(&RecordQuery::new().verbose(true)).await?;
    ///     println!("{} of {} records", result.records.len(), result.total_count);
    ///     Ok(())
    /// }
    /// ```
    pub async fn query_records(&self, query: &RecordQuery) -> Result<QueryResult> {
        self.send_query(query, &self.config.retry_config).await
    }

    /// Fetch the given 1-based page of records
    ///
    /// # Errors
    ///
    /// Same as [`OstiClient::query_records`]; `page == 0` is
    /// `OstiError::InvalidParameter`.
    pub async fn query_page(&self, query: &RecordQuery, page: u32) -> Result<QueryResult> {
        if page == 0 {
            return Err(OstiError::InvalidParameter(
                "page numbers start at 1".to_string(),
            ));
        }
        self.query_records(&query.for_page(page)).await
    }

    /// Fetch every matching record, page by page
    ///
    /// Stops once `total_count` records (or `limit`, if smaller) have been
    /// collected, or when a page comes back empty. Unlike
    /// [`OstiClient::query_records`], a non-success status on any page is
    /// an error; throttling and server errors are retried first.
    ///
    /// The returned result carries all collected records, the latest
    /// total count, and the URL and date of the first request.
    ///
    /// # Errors
    ///
    /// * `OstiError::ApiError` - a page failed with a non-success status
    /// * any error of [`OstiClient::query_records`]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use osti_client::{OstiClient, RecordQuery};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = OstiClient::new();
    ///     let all = client.query_all_records(&RecordQuery::new(), Some(100)).await?;
    ///     for url in all.citation_urls()?.into_iter().flatten() {
    ///         println!("{}", url);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, query))]
    pub async fn query_all_records(
        &self,
        query: &RecordQuery,
        limit: Option<usize>,
    ) -> Result<QueryResult> {
        let single_attempt = RetryConfig::no_retry();
        let mut aggregate: Option<QueryResult> = None;
        let mut page = 1u32;

        loop {
            let paged = query.for_page(page);
            let result = with_retry(
                || async {
                    self.send_query(&paged, &single_attempt)
                        .await?
                        .error_for_status()
                },
                &self.config.retry_config,
                "OSTI page request",
            )
            .await?;

            let fetched = result.records.len();
            let mut all = match aggregate.take() {
                Some(mut all) => {
                    all.records.extend(result.records);
                    all.total_count = result.total_count;
                    all.status = result.status;
                    all
                }
                None => result,
            };

            let total = usize::try_from(all.total_count).unwrap_or(usize::MAX);
            let target = limit.map_or(total, |limit| limit.min(total));
            info!(
                page,
                fetched,
                collected = all.records.len(),
                total_count = all.total_count,
                "Fetched page"
            );

            if fetched == 0 || all.records.len() >= target {
                if all.records.len() < target {
                    warn!(
                        collected = all.records.len(),
                        target, "Empty page before reaching the total count"
                    );
                }
                all.records.truncate(target);
                return Ok(all);
            }
            aggregate = Some(all);
            page += 1;
        }
    }

    #[instrument(skip(self, query, retry_config))]
    async fn send_query(
        &self,
        query: &RecordQuery,
        retry_config: &RetryConfig,
    ) -> Result<QueryResult> {
        let endpoint = query.endpoint_override().unwrap_or(&self.base_url);
        let params = query.build_params()?;
        let url = build_request_url(endpoint, &params)?;

        let response = self.make_request(&url, retry_config).await?;

        let status = response.status();
        let request_date = response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let total_count = parse_total_count(response.headers())?;
        let resolved_url = response.url().to_string();

        let body = response.text().await?;
        let records = decode_records(&body, status)?;

        let result = QueryResult {
            records,
            total_count,
            status: status.as_u16(),
            request_date,
            url: resolved_url,
        };

        debug!(
            status = result.status,
            returned = result.records.len(),
            total_count = result.total_count,
            "Query completed"
        );
        if !result.is_success() {
            warn!("API request returned status: {}", status);
        }
        report_if_verbose(query, &result, &mut std::io::stdout().lock());

        Ok(result)
    }

    async fn make_request(&self, url: &str, retry_config: &RetryConfig) -> Result<Response> {
        with_retry(
            || async {
                self.rate_limiter.acquire().await?;
                debug!("Making API request to: {}", url);
                self.client
                    .get(url)
                    .send()
                    .await
                    .map_err(OstiError::from)
            },
            retry_config,
            "OSTI API request",
        )
        .await
    }
}

impl Default for OstiClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_request_url(endpoint: &str, params: &QueryParameters) -> Result<String> {
    Url::parse(endpoint).map_err(|err| {
        OstiError::InvalidParameter(format!("invalid endpoint {:?}: {}", endpoint, err))
    })?;

    let query = params.to_query_string();
    if query.is_empty() {
        return Ok(endpoint.to_string());
    }
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", endpoint, separator, query))
}

fn parse_total_count(headers: &HeaderMap) -> Result<u64> {
    let value = headers
        .get(TOTAL_COUNT_HEADER)
        .ok_or(OstiError::TotalCountMissing)?;
    let text = value.to_str().map_err(|_| OstiError::TotalCountInvalid {
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    })?;
    text.trim()
        .parse::<u64>()
        .map_err(|_| OstiError::TotalCountInvalid {
            value: text.to_string(),
        })
}

fn build_http_client(config: &ClientConfig) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(config.effective_user_agent())
        .timeout(config.timeout)
        .build()?)
}

fn report_if_verbose<W: Write>(query: &RecordQuery, result: &QueryResult, out: &mut W) {
    if !query.is_verbose() {
        return;
    }
    if let Err(err) = writeln!(out, "{}", result.status_report()) {
        warn!(error = %err, "Failed to write status report");
    }
}

fn decode_records(body: &str, status: StatusCode) -> Result<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Vec<Value>>(body) {
        Ok(records) => Ok(records),
        Err(err) if !status.is_success() => {
            warn!(%status, error = %err, "Discarding undecodable error response body");
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}
