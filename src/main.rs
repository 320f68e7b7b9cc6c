use anyhow::Result;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ebay_connector::config::Settings;
use ebay_connector::{EbayConnector, ListingSource};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;

    let query = std::env::args().nth(1).unwrap_or_else(|| "laptop".to_string());
    let max_results: usize = std::env::args()
        .nth(2)
        .and_then(|n| n.parse().ok())
        .unwrap_or(15);

    let connector = EbayConnector::new(settings)?;
    if !connector.is_configured() {
        warn!("EBAY_CLIENT_ID / EBAY_CLIENT_SECRET not set; searches will return no results");
    }

    let listings = connector.search(&query, max_results).await;

    println!("{}", serde_json::to_string_pretty(&listings)?);
    println!("Found {} listings for '{}'", listings.len(), query);

    Ok(())
}
