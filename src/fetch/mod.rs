//! Minimal HTTP plumbing shared by the CLI and the backend source.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// GETs `url` and returns the body. Non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid URL '{url}'"))?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    let body = resp.bytes().await?.to_vec();
    debug!(url, %status, bytes = body.len(), "HTTP response received");

    if !status.is_success() {
        let snippet = String::from_utf8_lossy(&body[..body.len().min(200)]).into_owned();
        return Err(anyhow::anyhow!("GET {} returned status {}: {}", url, status, snippet));
    }
    Ok(body)
}

/// Like [`fetch_bytes`], decoding the body as UTF-8 text.
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let bytes = fetch_bytes(client, url).await?;
    String::from_utf8(bytes).with_context(|| format!("response from '{url}' is not UTF-8"))
}
