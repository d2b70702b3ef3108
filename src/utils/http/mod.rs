use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;

use crate::config::HttpConfig;

/// How much of an upstream error body is kept for logs (8 KB).
pub const ERROR_BODY_LIMIT: usize = 8 * 1024;

/// Build the shared `reqwest::Client` used for every outbound call.
///
/// Calls are single attempts; the configured connect/overall timeouts are the
/// only bound on how long a webhook waits on the search and reply APIs.
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(format!("shopcrab/{}", crate::VERSION))
        .build()
        .context("Failed to build HTTP client")
}

/// Read a response body as text, keeping at most `max_bytes`.
///
/// Streams via `chunk()` so an oversized body is never buffered whole, and
/// appends `[truncated]` when bytes were dropped.
pub async fn limited_text(mut resp: Response, max_bytes: usize) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut truncated = false;
    while let Some(chunk) = resp.chunk().await? {
        let remaining = max_bytes.saturating_sub(buf.len());
        if chunk.len() > remaining {
            buf.extend_from_slice(&chunk[..remaining]);
            truncated = true;
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    let mut text = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        text.push_str("\n[truncated]");
    }
    Ok(text)
}

#[cfg(test)]
mod tests;
