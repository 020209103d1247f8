use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use super::{create_osti_client, ClientOptions, FilterArgs};

#[derive(Args, Debug)]
pub struct Count {
    #[command(flatten)]
    filters: FilterArgs,

    /// Also print the number of pages
    #[arg(long)]
    pages: bool,
}

impl Count {
    pub async fn execute(&self, options: &ClientOptions) -> Result<()> {
        let client = create_osti_client(options)?;
        let query = self.filters.build_query()?;

        let result = client.query_records(&query).await?;
        if !result.is_success() {
            bail!("query failed with HTTP status {}", result.status);
        }

        info!(url = %result.url, "Count retrieved");
        if self.pages {
            println!("{}\t{}", result.total_count, result.page_count());
        } else {
            println!("{}", result.total_count);
        }
        Ok(())
    }
}
