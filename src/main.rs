use anyhow::{Context, Result};
use clap::Parser;
use rollscraper::{
    config::OutputFormat,
    discover, scrape,
    table::{output_stem, write_outputs},
    Config, HttpTransport,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape assessment records for every property in a jurisdiction.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Jurisdiction code (overrides the config file)
    #[arg(short, long)]
    jurisdiction: Option<u32>,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Pause after each property, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Only scrape the first N roll numbers
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) config ───────────────────────────────────────────────────
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("loading config")?;
    if let Some(jur) = args.jurisdiction {
        config.jurisdiction = jur;
    }
    if let Some(dir) = &args.out_dir {
        config.output_dir = dir.display().to_string();
    }
    if let Some(format) = args.format {
        config.output_format = format;
    }
    if let Some(ms) = args.delay_ms {
        config.request_delay_ms = ms;
    }
    info!(jurisdiction = config.jurisdiction, "startup");

    let transport = HttpTransport::new(&config).context("building HTTP client")?;

    // ─── 3) discover roll numbers ────────────────────────────────────
    let mut rolls = discover::get_roll_nums(&transport, &config, config.jurisdiction)
        .await
        .context("retrieving roll numbers")?;
    if let Some(limit) = args.limit {
        rolls.truncate(limit);
    }
    info!("{} properties to scrape", rolls.len());

    // ─── 4) scrape each property ─────────────────────────────────────
    let table = scrape::scrape_table(&transport, &config, &rolls)
        .await
        .context("scraping property pages")?;

    // ─── 5) export ───────────────────────────────────────────────────
    let batch = table.to_record_batch()?;
    let stem = output_stem("bca", config.jurisdiction);
    let written = write_outputs(
        &batch,
        Path::new(&config.output_dir),
        &stem,
        config.output_format,
    )
    .context("writing output")?;
    for path in written {
        info!("wrote {}", path.display());
    }

    info!("all done");
    Ok(())
}
