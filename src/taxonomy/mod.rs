pub mod adapter;
pub mod assemble;
pub mod translate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::rows::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    #[serde(default)]
    pub group: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_zh: Option<String>,
    #[serde(default)]
    pub subtopics: Vec<Subtopic>,
    /// Problems listed before any sub-heading.
    #[serde(default)]
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_zh: Option<String>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(deserialize_with = "problem_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_predicted: Option<bool>,
    /// Importance labels from the sub-heading level (CORE, ADVANCED, ...).
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

// Ids are numeric in scraped rows and strings in the document.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn problem_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

impl Section {
    pub fn problem_count(&self) -> usize {
        self.problems.len() + self.subtopics.iter().map(|s| s.problems.len()).sum::<usize>()
    }
}

impl Topic {
    pub fn problem_count(&self) -> usize {
        self.sections.iter().map(Section::problem_count).sum()
    }

    pub fn has_problems(&self) -> bool {
        self.sections.iter().any(|s| s.problem_count() > 0)
    }

    /// Every leaf problem: each section's own list, then its subtopics'.
    pub fn problems(&self) -> impl Iterator<Item = &Problem> + '_ {
        self.sections.iter().flat_map(|s| {
            s.problems
                .iter()
                .chain(s.subtopics.iter().flat_map(|sub| sub.problems.iter()))
        })
    }
}

pub fn load_document(path: &Path) -> Result<Vec<Topic>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid taxonomy document {}", path.display()))
}

pub fn save_document(path: &Path, topics: &[Topic]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(topics)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
