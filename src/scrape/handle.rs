// src/scrape/handle.rs

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::http::Transport;

/// Success marker the lookup endpoint prefixes onto every handle.
pub const HANDLE_MARKER: &str = "ok-";

/// `{base}/{jur}?roll={roll}`
pub fn lookup_url(base: &Url, jur: u32, roll: &str) -> Result<Url> {
    let mut url = base.join(&jur.to_string())?;
    url.query_pairs_mut().append_pair("roll", roll);
    Ok(url)
}

/// Decode a lookup body: a JSON string of the form `"ok-<handle>"`.
pub fn parse_handle(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body.trim())
        .map_err(|_| ScrapeError::UnexpectedShape(body.to_string()))?;
    let Value::String(s) = value else {
        return Err(ScrapeError::UnexpectedShape(body.to_string()));
    };
    match s.strip_prefix(HANDLE_MARKER) {
        Some(handle) if !handle.is_empty() => Ok(handle.to_string()),
        _ => Err(ScrapeError::MissingMarker(s)),
    }
}

/// Ask the site which page handle belongs to `(jur, roll)`.
pub async fn resolve_handle<T: Transport>(
    transport: &T,
    base: &Url,
    jur: u32,
    roll: &str,
) -> Result<String> {
    let url = lookup_url(base, jur, roll)?;
    let resp = transport.get(&url).await?;
    if resp.status != StatusCode::OK {
        return Err(ScrapeError::HandleResolution {
            jur,
            roll: roll.to_string(),
            status: resp.status,
        });
    }
    let handle = parse_handle(&resp.body)?;
    debug!(jur, roll, %handle, "resolved handle");
    Ok(handle)
}
