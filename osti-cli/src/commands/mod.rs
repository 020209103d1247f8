pub mod count;
pub mod search;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use osti_client::osti::DateRange;
use osti_client::{ClientConfig, OstiClient, QueryParameters, RecordQuery};

/// Connection settings shared by all commands
#[derive(Args, Debug, Clone)]
pub struct ClientOptions {
    /// Records search endpoint
    #[arg(long, env = "OSTI_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "OSTI_TIMEOUT", default_value = "30", global = true)]
    timeout: u64,

    /// Maximum requests per second
    #[arg(long, env = "OSTI_RATE_LIMIT", global = true, value_parser = parse_rate_limit)]
    rate_limit: Option<f64>,
}

fn parse_rate_limit(raw: &str) -> std::result::Result<f64, String> {
    let rate: f64 = raw
        .parse()
        .map_err(|_| format!("{:?} is not a number", raw))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("must be greater than 0, got {}", raw))
    }
}

pub fn create_osti_client(options: &ClientOptions) -> Result<OstiClient> {
    let mut config = ClientConfig::new()
        .with_timeout(Duration::from_secs(options.timeout))
        .with_user_agent(format!("osti-cli/{}", env!("CARGO_PKG_VERSION")));

    if let Some(ref endpoint) = options.endpoint {
        config = config.with_base_url(endpoint);
    }

    if let Some(rate) = options.rate_limit {
        config = config.with_rate_limit(rate);
    }

    OstiClient::try_with_config(config).context("failed to create OSTI client")
}

/// Record filters shared by all commands
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Earliest publication date (MM/DD/YYYY)
    #[arg(long, default_value = "01/01/1980")]
    start_date: String,

    /// Latest publication date (MM/DD/YYYY, default: today)
    #[arg(long)]
    end_date: Option<String>,

    /// Sponsoring organization code
    #[arg(long, default_value = "EE-4S")]
    sponsor_org: String,

    /// Sort order
    #[arg(long, default_value = "publication_date desc")]
    sort: String,

    /// Additional API parameter as key=value (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
}

impl FilterArgs {
    pub fn build_query(&self) -> Result<RecordQuery> {
        let date_range =
            DateRange::parse(Some(self.start_date.as_str()), self.end_date.as_deref())?;

        let mut params = QueryParameters::empty()
            .with_sort(self.sort.as_str())
            .with_sponsor_org(&self.sponsor_org);
        for raw in &self.params {
            let (key, value) = parse_param(raw)?;
            params.set(key, value);
        }

        Ok(RecordQuery::new().params(params).date_range(date_range))
    }
}

fn parse_param(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("invalid parameter {:?}, expected KEY=VALUE", raw),
    }
}
