//! Property assessment scraper.
//!
//! Two stages, run in order: [`discover::get_roll_nums`] lists every roll
//! number in a jurisdiction from the assessment feature service, then
//! [`scrape::get_bca_data`] visits each property's print page and collects its
//! labelled fields into an [`table::OutputTable`].

pub mod config;
pub mod discover;
pub mod error;
pub mod http;
pub mod scrape;
pub mod table;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use http::{HttpTransport, Transport};
