//! faqline server binary
//!
//! Serves the FAQ retrieval pipeline over HTTP for the voice-agent
//! front end.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
