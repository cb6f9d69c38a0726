mod config;
mod db;
mod pages;
mod parser;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use config::Settings;
use db::{JsonFileSink, RecordSink};

#[derive(Parser)]
#[command(name = "neondb", about = "Neon Abyss wiki item/weapon table extractor")]
struct Cli {
    /// Settings file shared with the viewer and translation stages
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract item records from saved wiki pages
    Extract {
        /// Saved HTML pages (Items, Weapons, ...)
        #[arg(required = true)]
        pages: Vec<PathBuf>,
        /// Write all records into this one file instead of the configured databases
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Page URL used to resolve relative links (default: wiki_base_url from config)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Show item database statistics
    Stats {
        #[arg(required = true)]
        dbs: Vec<PathBuf>,
    },
    /// List asset file names and URLs referenced by item databases
    Assets {
        #[arg(required = true)]
        dbs: Vec<PathBuf>,
    },
    /// Print the resolved configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    match cli.command {
        Commands::Extract {
            pages,
            output,
            base_url,
        } => {
            let base_url = base_url.or_else(|| settings.wiki_base_url.clone());
            let mut sink = JsonFileSink;
            let written = extract(&settings, &pages, output.as_deref(), base_url.as_deref(), &mut sink)?;
            println!("Saved {} records.", written);
        }
        Commands::Stats { dbs } => {
            for path in &dbs {
                let records = db::load(path)?;
                let s = db::get_stats(&records);
                println!("{}", path.display());
                println!("  Records:        {}", s.total);
                println!("  Items:          {}", s.items);
                println!("  Weapons:        {}", s.weapons);
                println!("  With item set:  {}", s.with_item_set);
                println!("  With abilities: {}", s.with_abilities);
                println!("  Active links:   {}", s.active_links);
            }
        }
        Commands::Assets { dbs } => {
            for path in &dbs {
                let records = db::load(path)?;
                for (name, url) in db::asset_manifest(&records) {
                    println!("{}\t{}", name, url);
                }
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

/// Extract every page and hand the records to `sink`: all into `output` when
/// given, otherwise page i into the i-th configured wiki database.
fn extract(
    settings: &Settings,
    pages: &[PathBuf],
    output: Option<&Path>,
    base_url: Option<&str>,
    sink: &mut dyn RecordSink,
) -> Result<usize> {
    if output.is_none() && pages.len() != settings.base_item_db.len() {
        bail!(
            "{} pages given but {} base_item_db paths configured; pass --output or fix the config",
            pages.len(),
            settings.base_item_db.len()
        );
    }

    let results = pages::process_pages(pages, base_url)?;
    let total = results.iter().map(|p| p.records.len()).sum();

    match output {
        Some(path) => {
            let skipped: usize = results.iter().map(|p| p.skipped).sum();
            let all: Vec<_> = results.into_iter().flat_map(|p| p.records).collect();
            sink.save(path, &all)?;
            info!("Wrote {} records to {} ({} rows skipped)", all.len(), path.display(), skipped);
        }
        None => {
            for (page, target) in results.iter().zip(&settings.base_item_db) {
                sink.save(target, &page.records)?;
                info!(
                    "Wrote {} records from {} to {} ({} rows skipped)",
                    page.records.len(),
                    page.path.display(),
                    target.display(),
                    page.skipped
                );
            }
        }
    }

    Ok(total)
}
