use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use share_audit::{AuditConfig, AuditEngine, ShareInput};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "share-audit")]
#[command(about = "Reconstruct a threshold-shared secret and find the corrupted share")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// JSON share document
    #[arg(default_value = "test.json")]
    input: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
    /// JSON file with audit settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Error rate (percent) a share must exceed to be flagged
    #[arg(long)]
    error_threshold: Option<f64>,
    /// Rows shown in the secret frequency table
    #[arg(long)]
    ranking_limit: Option<usize>,
    /// Refuse inputs with more combinations than this
    #[arg(long)]
    max_combinations: Option<u128>,
    /// Evaluate on the current thread only
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = load_config(&args)?;
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let shares = ShareInput::from_json(&text)
        .and_then(ShareInput::into_share_set)
        .with_context(|| format!("invalid share document {}", args.input.display()))?;

    info!(
        shares = shares.len(),
        threshold = shares.threshold(),
        parallel = config.parallel,
        "starting audit"
    );
    let report = AuditEngine::new(config).audit(&shares)?;

    match args.format {
        Format::Text => {
            println!("Shamir's Secret Sharing - Error Detection");
            println!("{}", "=".repeat(50));
            print!("{report}");
        }
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<AuditConfig> {
    let base = match &args.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    let mut config = base.with_env()?;
    if let Some(t) = args.error_threshold {
        config.error_threshold_percent = t;
    }
    if let Some(n) = args.ranking_limit {
        config.ranking_limit = n;
    }
    if let Some(n) = args.max_combinations {
        config.max_combinations = Some(n);
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
