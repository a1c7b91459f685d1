// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Every failure the pipeline can hit. None of them are retried; each one
/// aborts the batch it occurs in.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("feature service query failed: {0}")]
    UpstreamQuery(String),

    #[error("cannot coerce {column} = {value} for roll {roll} to a whole number")]
    Coercion {
        column: &'static str,
        roll: String,
        value: String,
    },

    #[error("roll lookup for {jur}/{roll} returned {status}")]
    HandleResolution {
        jur: u32,
        roll: String,
        status: StatusCode,
    },

    #[error("print page {url} returned {status}")]
    PageFetch { url: String, status: StatusCode },

    #[error("roll lookup body is not a JSON string: {0}")]
    UnexpectedShape(String),

    #[error("roll lookup body {0:?} does not carry an `ok-` handle")]
    MissingMarker(String),

    #[error("page handle {0:?} contains `?` or `#`")]
    InvalidHandle(String),

    #[error("{jurs} jurisdiction codes but {rolls} roll numbers")]
    LengthMismatch { jurs: usize, rolls: usize },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
