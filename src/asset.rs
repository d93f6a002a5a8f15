use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// Decorative banner download (best effort)
// ---------------------------------------------------------------------------

/// Download the decorative banner shown above the filters.
///
/// Returns `None` on any failure or non-success status; the dashboard then
/// simply shows no banner.
pub fn fetch_decorative_asset(url: &str, timeout: Duration) -> Option<Arc<[u8]>> {
    match try_fetch(url, timeout) {
        Ok(Some(bytes)) => {
            log::info!("Fetched banner ({} bytes) from {url}", bytes.len());
            Some(bytes.into())
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Skipping banner: {e:#}");
            None
        }
    }
}

fn try_fetch(url: &str, timeout: Duration) -> Result<Option<Vec<u8>>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?;

    let status = response.status();
    if !status.is_success() {
        log::debug!("Banner request to {url} returned {status}");
        return Ok(None);
    }

    let body = response.bytes().context("reading banner body")?;
    Ok(Some(body.to_vec()))
}

/// `bytes://` URI under which egui caches the banner.  The extension lets
/// the image loaders pick a decoder.
pub fn banner_uri(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string());
    format!("bytes://banner.{ext}")
}
