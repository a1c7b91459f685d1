// src/scrape/mod.rs

pub mod fields;
pub mod handle;

use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::http::Transport;
use crate::table::{OutputTable, PropertyRow, RollTable};

pub use fields::{extract_fields, DYNAMIC_IDS};
pub use handle::resolve_handle;

/// `{print_base}{handle}`. The handle is appended as-is, so a `/` in it stays
/// a path separator; `?` and `#` would change the URL's meaning and are refused.
pub fn print_url(base: &Url, handle: &str) -> Result<Url> {
    if handle.contains(['?', '#']) {
        return Err(ScrapeError::InvalidHandle(handle.to_string()));
    }
    let mut raw = base.to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    raw.push_str(handle);
    Ok(Url::parse(&raw)?)
}

/// Fetch the print-friendly property page for `handle`.
pub async fn fetch_page<T: Transport>(transport: &T, base: &Url, handle: &str) -> Result<String> {
    let url = print_url(base, handle)?;
    let resp = transport.get(&url).await?;
    if resp.status != StatusCode::OK {
        return Err(ScrapeError::PageFetch {
            url: url.to_string(),
            status: resp.status,
        });
    }
    Ok(resp.body)
}

/// Resolve, fetch and extract a single property. No pause, no retry; callers
/// that want per-item error handling can drive this directly.
pub async fn scrape_property<T: Transport>(
    transport: &T,
    config: &Config,
    jur: u32,
    roll: &str,
) -> Result<PropertyRow> {
    let handle = resolve_handle(transport, &config.lookup_url()?, jur, roll).await?;
    let html = fetch_page(transport, &config.print_url()?, &handle).await?;
    let fields = extract_fields(&html);
    debug!(jur, roll, fields = fields.len(), "scraped property");
    Ok(PropertyRow {
        jur,
        roll: roll.to_string(),
        fields,
    })
}

/// Scrape every `(jurs[i], rolls[i])` pair in order, pausing
/// `config.request_delay()` after each row. The first failure aborts the batch.
#[instrument(level = "info", skip_all, fields(records = jurs.len()))]
pub async fn get_bca_data<T: Transport>(
    transport: &T,
    config: &Config,
    jurs: &[u32],
    rolls: &[String],
) -> Result<OutputTable> {
    if jurs.len() != rolls.len() {
        return Err(ScrapeError::LengthMismatch {
            jurs: jurs.len(),
            rolls: rolls.len(),
        });
    }

    let n = jurs.len();
    let delay = config.request_delay();
    let mut table = OutputTable::new();

    for (i, (&jur, roll)) in jurs.iter().zip(rolls).enumerate() {
        let row = scrape_property(transport, config, jur, roll).await?;
        table.push(row);

        let done = i + 1;
        info!(
            "{} out of {} records scraped ({:.2}% complete)",
            done,
            n,
            done as f64 / n as f64 * 100.0
        );

        sleep(delay).await;
    }

    Ok(table)
}

/// [`get_bca_data`] over the jurisdiction and roll columns of a discovery result.
pub async fn scrape_table<T: Transport>(
    transport: &T,
    config: &Config,
    rolls: &RollTable,
) -> Result<OutputTable> {
    get_bca_data(transport, config, &rolls.jurisdictions(), &rolls.rolls()).await
}
