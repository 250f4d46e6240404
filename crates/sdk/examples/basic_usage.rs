//! Basic SDK usage example.
//!
//! Lists a few apps, reads one page of records and counts every record in
//! the first app.
//!
//! Run with:
//! KINTONE_DOMAIN=example.cybozu.com KINTONE_API_TOKEN=... cargo run --example basic_usage

use kintone_sdk::{AppsQuery, KintoneClient, KintoneError, KintoneResult, RecordsQuery};
use std::time::Duration;

#[tokio::main]
async fn main() -> KintoneResult<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let domain = std::env::var("KINTONE_DOMAIN")
        .map_err(|_| KintoneError::Config("KINTONE_DOMAIN is not set".to_string()))?;
    let token = std::env::var("KINTONE_API_TOKEN").unwrap_or_default();

    let client = KintoneClient::builder()
        .domain(domain)
        .api_token(&token)
        .timeout(Duration::from_secs(30))
        .build()?;

    println!("Listing apps...");
    let apps = client.apps().list(&AppsQuery::new().limit(5)).await?;
    for app in &apps.apps {
        println!("  App {}: {}", app.app_id, app.name);
    }

    let Some(first) = apps.apps.first() else {
        println!("No apps visible with these credentials");
        return Ok(());
    };
    let app_id: u64 = first
        .app_id
        .parse()
        .map_err(|_| KintoneError::Validation(format!("bad app id {}", first.app_id)))?;

    println!("\nFirst page of app {}...", app_id);
    let page = client
        .records()
        .get_page(&RecordsQuery::new(app_id).limit(10).total_count(true))
        .await?;
    println!(
        "Got {} of {} records",
        page.records.len(),
        page.total_count.as_deref().unwrap_or("?")
    );

    let all = client
        .records()
        .get_all(app_id, Some("order by $id asc"), &["$id".to_string()])
        .await?;
    println!("Fetched all {} record ids", all.len());

    Ok(())
}
