// src/config.rs

use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Prince George.
pub const DEFAULT_JURISDICTION: u32 = 226;

static DEFAULT_FEATURE_LAYER_URL: &str =
    "https://arcgis.bcassessment.ca/ext_wa/rest/services/SBWM/SBWM/MapServer/2/";
static DEFAULT_LOOKUP_URL: &str = "https://www.bcassessment.ca/Property/Search/GetByRollNumber/";
static DEFAULT_PRINT_URL: &str = "https://www.bcassessment.ca/property/info/print/";

/// Which files the binaries write once the pipeline is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    Both,
}

impl OutputFormat {
    pub fn csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn parquet(self) -> bool {
        matches!(self, OutputFormat::Parquet | OutputFormat::Both)
    }
}

/// Runtime settings. Every field defaults to the behaviour of the original
/// batch job, so an empty (or absent) YAML file reproduces it exactly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jurisdiction: u32,
    pub feature_layer_url: String,
    pub lookup_url: String,
    pub print_url: String,
    /// Pause after every scraped property.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Records requested per feature service page.
    pub page_size: usize,
    pub user_agent: String,
    pub output_dir: String,
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jurisdiction: DEFAULT_JURISDICTION,
            feature_layer_url: DEFAULT_FEATURE_LAYER_URL.to_string(),
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            print_url: DEFAULT_PRINT_URL.to_string(),
            request_delay_ms: 3_000,
            request_timeout_secs: 60,
            page_size: 1_000,
            user_agent: concat!("rollscraper/", env!("CARGO_PKG_VERSION")).to_string(),
            output_dir: "output".to_string(),
            output_format: OutputFormat::Both,
        }
    }
}

impl Config {
    /// Read a YAML config file, or fall back to defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_yaml(&text)
            .map_err(|e| ScrapeError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct; treat it as "all defaults"
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config =
            serde_yaml::from_str(text).map_err(|e| ScrapeError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ScrapeError::Config("page_size must be positive".into()));
        }
        self.feature_layer_url()?;
        self.lookup_url()?;
        self.print_url()?;
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn feature_layer_url(&self) -> Result<Url> {
        base_url(&self.feature_layer_url)
    }

    pub fn lookup_url(&self) -> Result<Url> {
        base_url(&self.lookup_url)
    }

    pub fn print_url(&self) -> Result<Url> {
        base_url(&self.print_url)
    }
}

/// Parse a base URL, making sure it ends in `/` so segments append instead of replace.
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(ScrapeError::Config(format!("{} cannot be a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
