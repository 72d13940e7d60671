mod catalog;
mod config;
mod parser;
mod progress;
mod rows;
mod scraper;
mod taxonomy;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::catalog::Bucket;
use crate::config::Settings;
use crate::progress::{JsonFileStore, Progress};
use crate::scraper::BucketOutcome;
use crate::taxonomy::adapter::{adapt, AdapterRules};
use crate::taxonomy::translate::Translations;

#[derive(Parser)]
#[command(name = "galaxy_roadmap", about = "Problem-list extractor and study roadmap")]
struct Cli {
    /// Folder with one sub-folder of saved pages per bucket
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,
    /// Folder the JSON outputs are written to
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    /// Solved-set file
    #[arg(long, global = true)]
    progress_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract saved pages into flat row files, one per bucket
    Scrape {
        /// Only this bucket (default: all)
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Build the taxonomy document from a written row file
    Assemble {
        #[arg(short, long, default_value = catalog::GRAPH_BUCKET)]
        bucket: String,
    },
    /// Scrape every bucket, then assemble the taxonomy document
    Run,
    /// Show the ordered roadmap with solved progress
    Roadmap {
        /// Taxonomy document (default: <out_dir>/taxonomy_graph.json)
        #[arg(short, long)]
        taxonomy: Option<PathBuf>,
    },
    /// Toggle a problem in the solved-set
    Solve { id: String },
    /// Row counts per written bucket
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?.with_overrides(cli.raw_dir, cli.out_dir, cli.progress_file);

    let result = match cli.command {
        Commands::Scrape { bucket } => {
            let buckets = select_buckets(bucket.as_deref())?;
            let outcomes = scraper::process_buckets(&settings, &buckets);
            print_outcomes(&outcomes);
            ensure_any_written(&outcomes)
        }
        Commands::Assemble { bucket } => {
            let Some(bucket) = catalog::find_bucket(&bucket) else {
                bail!("Unknown bucket '{}'", bucket);
            };
            let rows = rows::read_rows(&settings.output_path(bucket.output))?;
            let translations = Translations::load(settings.translations_path())?;
            let topics = taxonomy::assemble::assemble(&rows, &[], &translations);
            let path = settings.taxonomy_path();
            taxonomy::save_document(&path, &topics)?;
            println!("Assembled {} topics from {} rows into {}", topics.len(), rows.len(), path.display());
            Ok(())
        }
        Commands::Run => {
            let t_scrape = Instant::now();
            let outcomes = scraper::process_buckets(&settings, &catalog::BUCKETS.iter().collect::<Vec<_>>());
            print_outcomes(&outcomes);
            println!("Scraped in {}", format_duration(t_scrape.elapsed()));

            let graph = outcomes.iter().find_map(|o| match o {
                BucketOutcome::Written { extraction, .. } if extraction.bucket.name == catalog::GRAPH_BUCKET => {
                    Some(extraction)
                }
                _ => None,
            });
            match graph {
                Some(extraction) => {
                    let translations = Translations::load(settings.translations_path())?;
                    let topics = taxonomy::assemble::assemble(
                        &extraction.rows,
                        &extraction.descriptions,
                        &translations,
                    );
                    let path = settings.taxonomy_path();
                    taxonomy::save_document(&path, &topics)?;
                    println!("Assembled {} topics into {}", topics.len(), path.display());
                }
                None => println!("No {} rows, taxonomy document left as is.", catalog::GRAPH_BUCKET),
            }
            ensure_any_written(&outcomes)
        }
        Commands::Roadmap { taxonomy: document_path } => {
            let path = document_path.unwrap_or_else(|| settings.taxonomy_path());
            let document = taxonomy::load_document(&path)?;
            let roadmap = adapt(&document, &AdapterRules::default());
            let progress = Progress::load(JsonFileStore::new(settings.progress_path()))?;

            if roadmap.topics.is_empty() {
                println!("No topics with problems in {}.", path.display());
                return Ok(());
            }

            println!(
                "{:>3} | {:<28} | {:<26} | {:>8} | {:>6}",
                "#", "Topic", "Group", "Problems", "Solved"
            );
            println!("{}", "-".repeat(84));
            for (i, topic) in roadmap.topics.iter().enumerate() {
                println!(
                    "{:>3} | {:<28} | {:<26} | {:>8} | {:>6}",
                    i + 1,
                    truncate(&topic.title, 28),
                    truncate(&topic.group, 26),
                    topic.problem_count(),
                    progress.solved_in(topic)
                );
            }
            println!(
                "\n{} problems | {} solved ({}%)",
                roadmap.total_problems,
                progress.solved_count(),
                progress.percentage(roadmap.total_problems)
            );
            Ok(())
        }
        Commands::Solve { id } => {
            let mut progress = Progress::load(JsonFileStore::new(settings.progress_path()))?;
            let solved = progress.toggle(&id)?;
            println!(
                "{} marked {} ({} solved)",
                id,
                if solved { "solved" } else { "unsolved" },
                progress.solved_count()
            );
            Ok(())
        }
        Commands::Stats => {
            for bucket in catalog::BUCKETS {
                let path = settings.output_path(bucket.output);
                if !path.exists() {
                    println!("{:<14} not written yet", bucket.name);
                    continue;
                }
                let s = rows::RowStats::from_rows(&rows::read_rows(&path)?);
                println!(
                    "{:<14} {:>5} rows | {:>5} unique | {:>5} rated | {:>4} premium | {:>2} categories",
                    bucket.name, s.total, s.unique_ids, s.rated, s.premium, s.categories
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn select_buckets(name: Option<&str>) -> Result<Vec<&'static Bucket>> {
    match name {
        None => Ok(catalog::BUCKETS.iter().collect()),
        Some(name) => match catalog::find_bucket(name) {
            Some(bucket) => Ok(vec![bucket]),
            None => bail!("Unknown bucket '{}'", name),
        },
    }
}

fn print_outcomes(outcomes: &[BucketOutcome]) {
    for outcome in outcomes {
        match outcome {
            BucketOutcome::Written { path, extraction } => println!(
                "{:<14} {} rows from {} pages ({} skipped, {} duplicates) -> {}",
                extraction.bucket.name,
                extraction.rows.len(),
                extraction.files,
                extraction.skipped,
                extraction.duplicates,
                path.display()
            ),
            BucketOutcome::Missing(bucket) => println!("{:<14} no raw folder, skipped", bucket.name),
            BucketOutcome::Failed(bucket, e) => println!("{:<14} failed: {:#}", bucket.name, e),
        }
    }
}

fn ensure_any_written(outcomes: &[BucketOutcome]) -> Result<()> {
    if outcomes.iter().any(BucketOutcome::is_written) {
        Ok(())
    } else {
        bail!("No bucket was written")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
