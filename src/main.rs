use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use job_dedup::canonicalizer::canonical_key;
use job_dedup::config::DedupConfig;
use job_dedup::dedup::{find_duplicate_pairs, DedupReport, Deduplicator, KeyStrategy};
use job_dedup::sheet::{open_sheet, RowSource, Sheet};
use job_dedup::utils::logger::init_logger;
use job_dedup::utils::truncate_display;

const LINK_DISPLAY_WIDTH: usize = 80;

#[derive(Parser)]
#[command(version, about = "Highlights job applications that point at the same posting", long_about = None)]
struct Cli {
    /// Config file (defaults to ./job_dedup.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find duplicate rows and write the highlight colors back to the sheet
    Check {
        /// CSV or .xlsx sheet with NO, LINK, RESUME, COMPANY NAME and JOB TITLE columns
        sheet: Option<PathBuf>,

        /// Worksheet to use in an .xlsx workbook
        #[arg(long)]
        sheet_name: Option<String>,

        /// Write the highlighted sheet here instead of over the input
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report duplicates without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        #[arg(long, value_enum)]
        strategy: Option<KeyStrategy>,
    },
    /// List every pair of rows whose links resolve to the same posting
    Pairs {
        sheet: Option<PathBuf>,
    },
    /// Print the canonical key of each URL
    Canon {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DedupConfig::load(cli.config.as_deref())?;
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = log_dir;
    }
    if let Err(e) = init_logger(&config.log_dir) {
        eprintln!("Logging disabled: {:#}", e);
    }

    match cli.command {
        Commands::Check { sheet, sheet_name, output, dry_run, json, strategy } => {
            if let Some(sheet) = sheet {
                config.sheet_path = sheet;
            }
            if let Some(sheet_name) = sheet_name {
                config.sheet_name = sheet_name;
            }
            if output.is_some() {
                config.output_path = output;
            }
            if let Some(strategy) = strategy {
                config.key_strategy = strategy;
            }
            check(&config, dry_run, json)
        }
        Commands::Pairs { sheet } => {
            if let Some(sheet) = sheet {
                config.sheet_path = sheet;
            }
            pairs(&config)
        }
        Commands::Canon { urls } => {
            for url in urls {
                println!("{}\t{}", url, canonical_key(&url));
            }
            Ok(())
        }
    }
}

fn check(config: &DedupConfig, dry_run: bool, json: bool) -> Result<()> {
    info!("Checking {}", config.sheet_path.display());
    let mut sheet: Box<dyn Sheet> = open_sheet(&config.sheet_options());
    let deduplicator = Deduplicator::new(config.key_strategy, config.cleanup_policy());

    let report = if dry_run {
        deduplicator.process(&sheet.read_rows()?)
    } else {
        deduplicator.run(sheet.as_mut())?
    };

    if json {
        let summary = report
            .summary_json(config.top_resumes)
            .context("Failed to serialize summary")?;
        println!("{}", summary);
    } else {
        print_summary(&report, config.top_resumes);
        if dry_run {
            println!("Dry run, {} left unchanged", sheet.target_path().display());
        } else {
            println!("Highlights saved to {}", sheet.target_path().display());
        }
    }

    Ok(())
}

fn print_summary(report: &DedupReport, top_resumes: usize) {
    for duplicate in &report.duplicates {
        println!("{} {}\t\t{}", duplicate.no, duplicate.company_name, duplicate.job_title);
    }
    println!("\nDuplicated IDs: {:?}", report.duplicated_ids());

    println!("\n=== SUMMARY ===");
    println!("Total rows: {}", report.total_rows);
    println!("Duplicate entries: {}", report.duplicate_count());

    let top = report.top_resumes(top_resumes);
    if !top.is_empty() {
        println!("\nTop resumes by usage:");
        for entry in top {
            println!("{}: {} times", entry.resume, entry.count);
        }
    }
}

fn pairs(config: &DedupConfig) -> Result<()> {
    let rows = open_sheet(&config.sheet_options()).read_rows()?;
    let pairs = find_duplicate_pairs(&rows);

    for pair in &pairs {
        println!(
            "{} {} {} {}",
            pair.first_no,
            pair.second_no,
            truncate_display(&pair.first_link, LINK_DISPLAY_WIDTH),
            truncate_display(&pair.second_link, LINK_DISPLAY_WIDTH)
        );
        println!("------------");
    }
    info!("Listed {} duplicate pairs", pairs.len());
    println!("{} duplicate pairs", pairs.len());

    Ok(())
}
