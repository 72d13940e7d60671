use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const SETTINGS_FILE: &str = "galaxy";
const ENV_PREFIX: &str = "GALAXY";

pub const TAXONOMY_FILE: &str = "taxonomy_graph.json";

/// Filesystem layout for a run. Read from `galaxy.toml` (optional), then
/// `GALAXY_*` environment variables; CLI flags override both.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub progress_file: PathBuf,
    /// Heading and description translation table
    pub translations_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw_galaxy_pages"),
            out_dir: PathBuf::from("data"),
            progress_file: PathBuf::from("data/progress.json"),
            translations_file: PathBuf::from("translations.json"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name(SETTINGS_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn with_overrides(
        mut self,
        raw_dir: Option<PathBuf>,
        out_dir: Option<PathBuf>,
        progress_file: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = raw_dir {
            self.raw_dir = dir;
        }
        if let Some(dir) = out_dir {
            self.out_dir = dir;
        }
        if let Some(file) = progress_file {
            self.progress_file = file;
        }
        self
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }

    pub fn taxonomy_path(&self) -> PathBuf {
        self.output_path(TAXONOMY_FILE)
    }

    pub fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.raw_dir.join(bucket)
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_file
    }

    pub fn translations_path(&self) -> &Path {
        &self.translations_file
    }
}
