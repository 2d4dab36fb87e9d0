// src/rpc.rs
use eyre::{eyre, Result};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::Address;

#[derive(Debug, Deserialize, Clone)]
pub struct HolderRow {
    pub address: String,
    pub balance: Decimal, // API sends a decimal string
}

#[derive(Debug, Deserialize)]
struct HoldersPage {
    #[serde(default)]
    results: Vec<HolderRow>,
}

const MAX_ATTEMPTS: u32 = 3;
const RETRY_PAUSE: Duration = Duration::from_secs(2);

fn holders_url(cfg: &Config, offset: usize) -> String {
    format!(
        "{}/{}/holders?offset={}&limit={}",
        cfg.holders_api_url.trim_end_matches('/'),
        cfg.rune_id,
        offset,
        cfg.page_limit
    )
}

fn parse_page(text: &str) -> Result<Vec<HolderRow>> {
    let page: HoldersPage = serde_json::from_str(text)?;
    Ok(page.results)
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Fetch one page with retries. Connection errors, 5xx and 429 are retried;
/// any other non-200 status fails at once.
async fn get_page(client: &Client, url: &str) -> Result<Vec<HolderRow>> {
    for attempt in 1..=MAX_ATTEMPTS {
        info!("📡 GET {}", url);

        let res = client.get(url).send().await;

        match res {
            Ok(resp) if resp.status() == StatusCode::OK => {
                let text = resp.text().await?;
                return parse_page(&text);
            }
            Ok(resp) if is_retryable(resp.status()) && attempt < MAX_ATTEMPTS => {
                warn!(
                    "⚠️ Holders API returned HTTP {} (attempt {}). Retrying...",
                    resp.status(),
                    attempt
                );
            }
            Ok(resp) => return Err(eyre!("Holders API error: HTTP {}", resp.status())),
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "⚠️ Holders request failed (attempt {}): {}. Retrying...",
                    attempt, e
                );
            }
            Err(e) => {
                return Err(eyre!(
                    "❌ Holders request failed after {} attempts: {}",
                    MAX_ATTEMPTS,
                    e
                ))
            }
        }
        tokio::time::sleep(RETRY_PAUSE).await;
    }

    Err(eyre!("Unreachable: retries exhausted"))
}

pub fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(20))
        .build()?)
}

/// Fetch every holder of the rune, walking offset pages until an empty or short page.
/// Any page failure fails the whole fetch; a partial list is never returned.
pub async fn fetch_current_balances(
    client: &Client,
    cfg: &Config,
) -> Result<Vec<(Address, Decimal)>> {
    let mut holders = Vec::new();
    let mut offset = 0;
    loop {
        let rows = get_page(client, &holders_url(cfg, offset)).await?;
        let count = rows.len();
        holders.extend(rows.into_iter().map(|r| (r.address, r.balance)));

        if count < cfg.page_limit {
            break;
        }
        offset += cfg.page_limit;
    }

    info!("Fetched {} holder rows for rune {}", holders.len(), cfg.rune_id);
    Ok(holders)
}
