use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::catalog::Bucket;
use crate::config::Settings;
use crate::parser::outline::Description;
use crate::parser::{extract_document, DocumentStatus, Source};
use crate::rows::{self, ProblemRow};

/// Everything pulled out of one bucket folder, before sorting.
pub struct BucketExtraction {
    pub bucket: &'static Bucket,
    pub files: usize,
    /// Files that were unreadable or had no content container.
    pub skipped: usize,
    pub duplicates: usize,
    /// Deduplicated rows in document order.
    pub rows: Vec<ProblemRow>,
    pub descriptions: Vec<Description>,
}

pub enum BucketOutcome {
    Written {
        path: PathBuf,
        extraction: BucketExtraction,
    },
    Missing(&'static Bucket),
    Failed(&'static Bucket, anyhow::Error),
}

impl BucketOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, BucketOutcome::Written { .. })
    }
}

/// `.html` files directly inside `dir`, sorted by file name.
pub fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

/// Extract every page in `dir`. `None` when the folder does not exist.
pub fn extract_bucket(dir: &Path, bucket: &'static Bucket) -> Result<Option<BucketExtraction>> {
    if !dir.is_dir() {
        warn!("Bucket folder {} not found, skipping {}", dir.display(), bucket.name);
        return Ok(None);
    }

    let files = html_files(dir)?;
    info!("Extracting {} pages from {}", files.len(), dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut skipped = 0usize;
    let mut all_rows = Vec::new();
    let mut descriptions = Vec::new();

    for path in &files {
        let source = Source::from_path(path);
        pb.set_message(source.stem.clone());

        match fs::read_to_string(path) {
            Ok(html) => {
                let extraction = extract_document(&html, &source);
                if extraction.status == DocumentStatus::MissingContainer {
                    skipped += 1;
                }
                debug!("{}: {} rows", source.stem, extraction.rows.len());
                all_rows.extend(extraction.rows);
                descriptions.extend(extraction.descriptions);
            }
            Err(e) => {
                warn!("Failed to read {}, skipping: {}", path.display(), e);
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let (rows, duplicates) = rows::dedup_rows(all_rows);
    if duplicates > 0 {
        debug!("Dropped {} duplicate rows in {}", duplicates, bucket.name);
    }

    Ok(Some(BucketExtraction {
        bucket,
        files: files.len(),
        skipped,
        duplicates,
        rows,
        descriptions,
    }))
}

/// Sort a copy of the rows by id and overwrite `path` with them.
pub fn write_bucket(path: &Path, extraction: &BucketExtraction) -> Result<()> {
    let mut sorted = extraction.rows.clone();
    rows::sort_rows(&mut sorted);
    rows::write_rows(path, &sorted)?;
    info!("Wrote {} rows to {}", sorted.len(), path.display());
    Ok(())
}

/// Extract and write one bucket. Failures are logged and reported, never
/// propagated, so sibling buckets still run.
pub fn process_bucket(settings: &Settings, bucket: &'static Bucket) -> BucketOutcome {
    let dir = settings.bucket_dir(bucket.name);
    let extraction = match extract_bucket(&dir, bucket) {
        Ok(Some(extraction)) => extraction,
        Ok(None) => return BucketOutcome::Missing(bucket),
        Err(e) => {
            error!("Bucket {} failed: {:#}", bucket.name, e);
            return BucketOutcome::Failed(bucket, e);
        }
    };

    let path = settings.output_path(bucket.output);
    match write_bucket(&path, &extraction) {
        Ok(()) => BucketOutcome::Written { path, extraction },
        Err(e) => {
            error!("Bucket {} failed: {:#}", bucket.name, e);
            BucketOutcome::Failed(bucket, e)
        }
    }
}

pub fn process_buckets(settings: &Settings, buckets: &[&'static Bucket]) -> Vec<BucketOutcome> {
    buckets.iter().map(|b| process_bucket(settings, b)).collect()
}
