use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::models::{parse_holding_codes, PipelineConfig};

#[derive(Parser)]
#[command(name = "takane")]
#[command(about = "65-week new-high screening pipeline for Japanese growth equities", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage 1: scan the market segment for 65-week intraday highs
    Scan {
        /// Override "today" (YYYY-MM-DD) for reproducible backtests
        #[arg(long)]
        today: Option<String>,

        /// Comma-separated watch-list codes (e.g. "5621,5527")
        #[arg(long)]
        holdings: Option<String>,

        /// Market segment name to scan
        #[arg(long)]
        segment: Option<String>,

        /// Scan snapshot output path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Stage 2: compute the 7 factors, score, and filter
    Analyze {
        /// Override "today" (YYYY-MM-DD) for reproducible backtests
        #[arg(long)]
        today: Option<String>,

        /// Comma-separated watch-list codes (e.g. "5621,5527")
        #[arg(long)]
        holdings: Option<String>,

        /// Scan snapshot to read
        #[arg(long)]
        input: Option<PathBuf>,

        /// Analysis snapshot output path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Market cap ceiling in oku-yen
        #[arg(long)]
        max_market_cap: Option<f64>,

        /// Price/earnings floor
        #[arg(long)]
        min_per: Option<f64>,
    },
    /// Stage 3: emit chart artifacts and the summary
    Report {
        /// Override "today" (YYYY-MM-DD) for reproducible backtests
        #[arg(long)]
        today: Option<String>,

        /// Analysis snapshot to read
        #[arg(long)]
        input: Option<PathBuf>,

        /// Artifact output directory
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Show current snapshot status
    Status,
}

pub fn run() {
    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env();

    match cli.command {
        Commands::Scan {
            today,
            holdings,
            segment,
            output,
        } => {
            apply_today(&mut config, today);
            if let Some(raw) = holdings {
                config.holding_codes = parse_holding_codes(&raw);
            }
            if let Some(segment) = segment {
                config.segment = segment;
            }
            if let Some(path) = output {
                config.scan_snapshot_path = path;
            }
            commands::scan::run(config);
        }
        Commands::Analyze {
            today,
            holdings,
            input,
            output,
            max_market_cap,
            min_per,
        } => {
            apply_today(&mut config, today);
            if let Some(raw) = holdings {
                config.holding_codes = parse_holding_codes(&raw);
            }
            if let Some(path) = input {
                config.scan_snapshot_path = path;
            }
            if let Some(path) = output {
                config.analysis_snapshot_path = path;
            }
            if let Some(ceiling) = max_market_cap {
                config.max_market_cap_okuyen = ceiling;
            }
            if let Some(floor) = min_per {
                config.min_per = floor;
            }
            commands::analyze::run(config);
        }
        Commands::Report {
            today,
            input,
            report_dir,
        } => {
            apply_today(&mut config, today);
            if let Some(path) = input {
                config.analysis_snapshot_path = path;
            }
            if let Some(dir) = report_dir {
                config.report_dir = dir;
            }
            commands::report::run(config);
        }
        Commands::Status => {
            commands::status::run(config);
        }
    }
}

fn apply_today(config: &mut PipelineConfig, raw: Option<String>) {
    if let Some(raw) = raw {
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => config.today = date,
            Err(e) => {
                eprintln!("❌ Invalid --today \"{}\": {} (expected YYYY-MM-DD)", raw, e);
                std::process::exit(1);
            }
        }
    }
}
