//! Sector Scout CLI: scan and score commands.
//!
//! Commands:
//! - `scan`: classify tickers from CSV price history and write the candidate snapshot
//! - `score`: judge evidence for each candidate and write the approved targets
//! - `config`: load, validate, and print the effective configuration

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scout_runner::snapshot::CandidateOrigin;
use scout_runner::{
    load_candidates, write_candidates, CsvPriceProvider, EvidenceFile, HttpJudge,
    RateLimitedSocial, RunSummary, ScanReport, Scanner, Scorer, ScoutConfig, TargetsSnapshot,
};

/// Exit code for a run that finished cleanly but approved nothing.
const EXIT_NO_CANDIDATES: i32 = 2;

#[derive(Parser)]
#[command(
    name = "scout",
    about = "Sector Scout: strategy screening and evidence-weighted approval"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify tickers into strategy buckets from daily price history.
    Scan {
        /// Directory holding <SYMBOL>.csv files.
        #[arg(long)]
        prices: PathBuf,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Candidate snapshot to write.
        #[arg(long, default_value = "dragnet_candidates.json")]
        out: PathBuf,

        /// Tickers to scan (e.g., SPY NVDA F).
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Score candidates against news and social evidence.
    Score {
        /// Evidence JSON keyed by ticker.
        #[arg(long)]
        evidence: PathBuf,

        /// Candidate snapshot from `scan`.
        #[arg(long, default_value = "dragnet_candidates.json")]
        candidates: PathBuf,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Targets snapshot to write.
        #[arg(long, default_value = "active_targets.json")]
        out: PathBuf,

        /// Override the judge endpoint from the config.
        #[arg(long)]
        judge_url: Option<String>,
    },
    /// Load, validate, and print the effective configuration.
    Config {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            prices,
            config,
            out,
            symbols,
        } => run_scan(&prices, config.as_deref(), &out, &symbols),
        Commands::Score {
            evidence,
            candidates,
            config,
            out,
            judge_url,
        } => {
            let summary = run_score(&evidence, &candidates, config.as_deref(), &out, judge_url)?;
            if !summary.has_candidates() {
                eprintln!("WARNING: no tickers were approved; targets snapshot marked no_candidates");
                std::process::exit(EXIT_NO_CANDIDATES);
            }
            Ok(())
        }
        Commands::Config { config } => run_config(config.as_deref()),
    }
}

/// Structured logs on stderr. `RUST_LOG` filters (default `info`);
/// `SCOUT_LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("SCOUT_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<ScoutConfig> {
    match path {
        Some(path) => ScoutConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScoutConfig::default()),
    }
}

fn run_scan(prices: &Path, config_path: Option<&Path>, out: &Path, symbols: &[String]) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = CsvPriceProvider::new(prices);

    let report = Scanner::new(&provider, &config.engine)
        .with_parallelism(config.scan.parallel)
        .scan(symbols);

    write_candidates(out, &report.candidates, Utc::now())
        .with_context(|| format!("failed to write candidates to {}", out.display()))?;

    print_scan(&report);
    println!("Candidates saved to: {}", out.display());
    Ok(())
}

fn run_score(
    evidence_path: &Path,
    candidates_path: &Path,
    config_path: Option<&Path>,
    out: &Path,
    judge_url: Option<String>,
) -> Result<RunSummary> {
    let mut config = load_config(config_path)?;
    if let Some(url) = judge_url {
        config.judge.url = url;
        config.validate().context("invalid --judge-url")?;
    }

    let evidence = EvidenceFile::from_file(evidence_path)
        .with_context(|| format!("failed to load evidence {}", evidence_path.display()))?;
    let social = RateLimitedSocial::new(
        evidence.clone(),
        Duration::from_millis(config.social.min_interval_ms),
    );
    let judge = HttpJudge::new(&config.judge).context("failed to build judge client")?;

    let now = Utc::now();
    let loaded = load_candidates(candidates_path, now);
    match &loaded.origin {
        CandidateOrigin::Snapshot { path, age_hours } => {
            info!(path = %path.display(), age_hours, count = loaded.candidates.len(), "loaded candidates");
        }
        CandidateOrigin::Watchlist { reason } => {
            warn!(%reason, "candidate snapshot unusable, scoring core watchlist");
        }
    }

    let scorer = Scorer::new(&config, &evidence, &social, &judge);
    let scored = scorer.score_all(&loaded.candidates, now);
    let summary = RunSummary::from_scored(&scored, loaded.skipped);

    info!(
        analyzed = summary.analyzed,
        approved = summary.approved,
        skipped = summary.skipped,
        unavailable = summary.unavailable_judgments,
        malformed = summary.malformed_judgments,
        "run complete"
    );

    let snapshot = TargetsSnapshot {
        targets: scorer.targets(&scored),
        updated: now,
        status: summary.status,
        run_id: config.run_id(now),
    };
    snapshot
        .write(out)
        .with_context(|| format!("failed to write targets to {}", out.display()))?;

    print_targets(&snapshot, &summary);
    println!("Targets saved to: {}", out.display());
    Ok(summary)
}

fn run_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let text = config.to_toml().context("failed to render config")?;
    print!("{text}");
    Ok(())
}

fn print_scan(report: &ScanReport) {
    println!();
    println!("=== Scan Result ===");
    println!("Requested:      {}", report.requested);
    println!("Classified:     {}", report.classified);
    println!("Unclassified:   {}", report.unclassified);
    println!("No data:        {}", report.no_data);
    for (reason, count) in &report.insufficient {
        println!("Insufficient:   {count} ({reason})");
    }
    println!();
    for (category, entries) in report.candidates.iter() {
        let symbols: Vec<&str> = entries.iter().map(|c| c.symbol.as_str()).collect();
        println!("{:<10} {}", category.name(), symbols.join(" "));
    }
    println!();
}

fn print_targets(snapshot: &TargetsSnapshot, summary: &RunSummary) {
    println!();
    println!("=== Approved Targets ===");
    for (category, entries) in snapshot.targets.iter() {
        if entries.is_empty() {
            continue;
        }
        println!("--- {} ---", category.name());
        for entry in entries {
            println!("{:<8} {:.2}  {}", entry.symbol, entry.confidence, entry.reason);
        }
    }
    println!();
    println!("{summary}");
    println!("Run ID:         {}", snapshot.run_id);
    println!();
}
