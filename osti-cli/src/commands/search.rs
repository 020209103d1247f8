use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use osti_client::osti::record_citation_url;
use osti_client::QueryResult;
use serde_json::Value;
use tracing::{info, warn};

use super::{create_osti_client, ClientOptions, FilterArgs};

#[derive(Args, Debug)]
pub struct Search {
    #[command(flatten)]
    filters: FilterArgs,

    /// Page to fetch (20 records per page)
    #[arg(long, default_value = "1", conflicts_with = "all")]
    page: u32,

    /// Fetch every matching record instead of a single page
    #[arg(long)]
    all: bool,

    /// Maximum number of records to output
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Save results to file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the query status summary to stdout
    #[arg(long)]
    status: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One JSON record per line
    Jsonl,
    /// Tab-separated OSTI id and citation URL
    Citations,
}

impl Search {
    pub async fn execute(&self, options: &ClientOptions) -> Result<()> {
        let client = create_osti_client(options)?;
        let query = self.filters.build_query()?.verbose(self.status);

        let result = if self.all {
            client.query_all_records(&query, self.limit).await?
        } else {
            let mut page = client.query_page(&query, self.page).await?;
            if !page.is_success() {
                bail!(
                    "query failed with HTTP status {} ({})",
                    page.status,
                    page.url
                );
            }
            if let Some(limit) = self.limit {
                page.records.truncate(limit);
            }
            page
        };

        info!(
            retrieved = result.records.len(),
            total_count = result.total_count,
            "Search completed"
        );

        let content = format_results(&result, self.format)?;
        self.output_results(&content).await
    }

    async fn output_results(&self, content: &str) -> Result<()> {
        match &self.output {
            Some(path) => {
                tokio::fs::write(path, content).await?;
                info!(path = %path.display(), "Results saved to file");
            }
            None => {
                println!("{}", content);
            }
        }
        Ok(())
    }
}

fn format_results(result: &QueryResult, format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&result.records)?,
        OutputFormat::Jsonl => result
            .records
            .iter()
            .map(serde_json::to_string)
            .collect::<serde_json::Result<Vec<_>>>()?
            .join("\n"),
        OutputFormat::Citations => result
            .records
            .iter()
            .map(citation_line)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(content)
}

fn citation_line(record: &Value) -> String {
    let osti_id = match record.get("osti_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };
    let url = record_citation_url(record).unwrap_or_else(|err| {
        warn!(osti_id = %osti_id, error = %err, "Record has no usable links");
        None
    });
    format!("{}\t{}", osti_id, url.unwrap_or_default())
}
