//! Payout receipt generator
//!
//! Reads a payout record (dashboard JSON) and saves its PDF receipt as
//! `<prefix>_<id>.pdf`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Parser;
use receipt_pdf::{
    generate_receipt, receipt_filename, DocumentStructure, ReceiptConfig, ReceiptRecord,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "payout-receipt")]
#[command(version, about = "Generate a PDF receipt for a payout record")]
struct Args {
    /// Payout record JSON file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Directory the receipt is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// TOML file overriding receipt wording
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generation timestamp (RFC 3339) printed in the footer; defaults to now
    #[arg(long)]
    generated_at: Option<String>,

    /// Re-read the written document and check its xref bookkeeping
    #[arg(long)]
    verify: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout is left free for the output path
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = run(&args)?;
    println!("{}", path.display());
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<PathBuf> {
    let config = match &args.config {
        Some(path) => ReceiptConfig::from_file(path)?,
        None => ReceiptConfig::default(),
    };

    let json = read_input(&args.input)?;
    let record = ReceiptRecord::from_json(&json)?;
    let generated_at = parse_generated_at(args.generated_at.as_deref())?;

    tracing::info!(id = %record.id, status = %record.status, "Generating receipt");
    let bytes = generate_receipt(&record, &config, generated_at);

    if args.verify {
        DocumentStructure::parse(&bytes)
            .and_then(|doc| doc.verify())
            .context("Generated receipt failed structural verification")?;
        tracing::info!("Receipt structure verified");
    }

    let path = args
        .output_dir
        .join(receipt_filename(&config.file_prefix, &record.id));
    write_receipt(&path, &bytes)?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Receipt saved");
    Ok(path)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read record from stdin")?;
        Ok(json)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read record file: {}", input))
    }
}

fn parse_generated_at(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(e) => bail!("Invalid --generated-at '{}': {}", raw, e),
        },
    }
}

fn write_receipt(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write receipt: {}", path.display()))
}
