//! One-shot retrieval smoke test.
//!
//! Reads a query from argv, runs it through the full pipeline against the
//! configured embedding engine and vector store, and prints the matches
//! plus the advisory stage breakdown.

use std::error::Error;

use faqline::{RetrievalConfig, RetrievalContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    let query = std::env::args()
        .nth(1)
        .ok_or("usage: faqline \"<query>\"")?;

    let config = RetrievalConfig::load()?;
    let context = RetrievalContext::connect(&config).await?;

    let outcome = context.retriever().search_with_timings(&query).await?;
    if outcome.matches.is_empty() {
        println!("no matches");
    }
    for hit in &outcome.matches {
        println!("[{:.4}] {}", hit.score, hit.question);
        println!("         {}", hit.answer);
    }
    for share in outcome.timings.breakdown() {
        println!(
            "{:>10}: {:.1}ms ({:.0}%)",
            share.stage, share.elapsed_ms, share.percent
        );
    }

    context.shutdown().await;
    Ok(())
}
