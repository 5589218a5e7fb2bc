mod config;
mod directory;
mod error;
mod parser;
mod report;
mod source;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::config::Settings;
use crate::directory::Directory;

#[derive(Parser)]
#[command(name = "fuelbook", about = "Fuel book directory extractor")]
struct Cli {
    /// Settings file (default: ./fuelbook.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract stations and terminals from page text (form-feed dump or page directory)
    Extract {
        input: PathBuf,
        #[arg(short, long, default_value = "fuel_stations_data.json")]
        output: PathBuf,
    },
    /// Extract stations and terminals from the review HTML
    ExtractHtml {
        input: PathBuf,
        #[arg(short, long, default_value = "fuel_stations_data.json")]
        output: PathBuf,
    },
    /// Stations table from a saved directory
    Overview {
        input: PathBuf,
        /// Filter by jurisdiction (e.g. "ALABAMA")
        #[arg(short, long)]
        jurisdiction: Option<String>,
        /// Filter by tier (Exclusive, Primary, Limited, Unknown)
        #[arg(short, long)]
        tier: Option<String>,
        /// Filter by brand (TA, PETRO)
        #[arg(short, long)]
        brand: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Totals by tier and brand for a saved directory
    Stats { input: PathBuf },
    /// Show which pages mention a jurisdiction and what headers they carry
    Inspect {
        input: PathBuf,
        /// Jurisdiction name as printed in the book (e.g. "ALABAMA")
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let t0 = Instant::now();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    debug!(?settings, "settings loaded");

    match cli.command {
        Commands::Extract { input, output } => {
            let pages = source::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            println!("Extracting {} pages from {}...", pages.page_count(), input.display());
            let dir = extract_with_progress(pages.as_ref(), &settings)?;
            save(&dir, &output)?;
            report::print_summary(&dir, &settings.terminal_bucket);
        }
        Commands::ExtractHtml { input, output } => {
            let html = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let dir = parser::html::extract_html(&html, &settings)?;
            save(&dir, &output)?;
            report::print_summary(&dir, &settings.terminal_bucket);
        }
        Commands::Overview {
            input,
            jurisdiction,
            tier,
            brand,
            limit,
        } => {
            let dir = load(&input)?;
            let filter = report::OverviewFilter {
                jurisdiction,
                tier,
                brand,
                limit,
            };
            let rows = report::overview_rows(&dir, &filter);
            if rows.is_empty() {
                println!("No stations found.");
                let labels: Vec<&str> = dir.labels().collect();
                println!("Sections: {}", labels.join(", "));
                return Ok(());
            }
            report::print_overview(&rows);
        }
        Commands::Stats { input } => {
            let dir = load(&input)?;
            report::stats(&dir, &settings.terminal_bucket).print();
        }
        Commands::Inspect { input, name } => {
            let pages = source::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let tracker = parser::sections::SectionTracker::new(
                &settings.jurisdictions(),
                &settings.section_marker,
            )?;
            let name = name.trim().to_uppercase();
            let found = report::inspect(pages.as_ref(), &tracker, &name, &settings.section_marker)?;
            report::print_inspection(&name, &found);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn extract_with_progress(pages: &dyn source::PageSource, settings: &Settings) -> anyhow::Result<Directory> {
    let pb = ProgressBar::new(pages.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages")?
            .progress_chars("#>-"),
    );

    let (mut records, mut terminals, mut dropped) = (0, 0, 0);
    let dir = parser::extract_pages(pages, settings, |outcome| {
        if let Some(label) = &outcome.header {
            debug!(page = outcome.page, jurisdiction = %label, "section header");
        }
        if outcome.terminal {
            debug!(page = outcome.page, "terminal block");
            terminals += 1;
        }
        records += outcome.records;
        dropped += outcome.dropped;
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    info!("{} station records, {} terminal blocks", records, terminals);
    if dropped > 0 {
        info!("{} record headers appeared before any jurisdiction and were skipped", dropped);
    }
    Ok(dir)
}

fn save(dir: &Directory, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(dir)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Data saved to: {}", path.display());
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<Directory> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let dir = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a saved directory", path.display()))?;
    Ok(dir)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
