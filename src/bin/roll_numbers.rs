// src/bin/roll_numbers.rs
//
// Discovery only: list every roll number in a jurisdiction and export it.

use anyhow::{Context, Result};
use clap::Parser;
use rollscraper::{
    config::OutputFormat,
    discover,
    table::{output_stem, write_outputs},
    Config, HttpTransport,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export the roll numbers of one jurisdiction")]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    jurisdiction: Option<u32>,

    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref()).context("loading config")?;
    let jur = args.jurisdiction.unwrap_or(config.jurisdiction);
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));
    let format = args.format.unwrap_or(config.output_format);

    let transport = HttpTransport::new(&config).context("building HTTP client")?;
    let rolls = discover::get_roll_nums(&transport, &config, jur)
        .await
        .context("retrieving roll numbers")?;

    let batch = rolls.to_record_batch()?;
    for path in write_outputs(&batch, Path::new(&out_dir), &output_stem("rolls", jur), format)? {
        info!("wrote {}", path.display());
    }
    Ok(())
}
