//! PUBS BURN - token risk scanner and burn service for Base

use anyhow::Result;

use pubs_burn::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
