//! Heading and description translation for the assembled document. Source
//! pages are written in Chinese; the adapter's keyword and title tables are
//! English.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::parser::nodes::normalize_ws;

static ZH_NUMERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:十[一二三四五六七八]|[零一二三四五六七八九十])、\s*").unwrap());
static SECTION_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:§\d+(?:\.\d+)*\s*|\d+(?:\.\d+)*\s+)").unwrap());
static ROMAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[IVX]+\.\s*").unwrap());
static SPECIAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^专题：\s*").unwrap());

/// Lookup tables: heading text (numbering stripped) → English title, and
/// description fragment → English text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Translations {
    titles: HashMap<String, String>,
    descriptions: HashMap<String, String>,
    #[serde(skip)]
    normalized: HashMap<String, String>,
}

impl Translations {
    /// A missing file is an empty table: titles keep their source text.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("No translation table at {}, titles keep their source text", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let table: Translations = serde_json::from_str(&json)
            .with_context(|| format!("Invalid translation table {}", path.display()))?;
        debug!(
            "Loaded {} title and {} description translations",
            table.titles.len(),
            table.descriptions.len()
        );
        Ok(table.indexed())
    }

    fn indexed(mut self) -> Self {
        self.normalized = self
            .descriptions
            .iter()
            .map(|(zh, en)| (normalize_ws(zh), en.clone()))
            .collect();
        self
    }

    pub fn title(&self, heading: &str) -> String {
        let core = strip_numbering(heading);
        match self.titles.get(core) {
            Some(title) => title.trim().to_string(),
            None => core.to_string(),
        }
    }

    /// Translate each line of a description; unknown lines pass through.
    pub fn description(&self, text: &str) -> String {
        text.lines()
            .map(|line| {
                let line = line.trim();
                self.descriptions
                    .get(line)
                    .or_else(|| self.normalized.get(&normalize_ws(line)))
                    .cloned()
                    .unwrap_or_else(|| line.to_string())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Drop leading numbering: `一、`, `§1.2` or `1.2 `, `IV.`, `专题：`, in
/// that order.
pub fn strip_numbering(heading: &str) -> &str {
    let mut core = heading.trim();
    for re in [&*ZH_NUMERAL_RE, &*SECTION_NUMBER_RE, &*ROMAN_RE, &*SPECIAL_RE] {
        if let Some(m) = re.find(core) {
            core = &core[m.end()..];
        }
    }
    core.trim()
}
