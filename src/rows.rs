use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Unknown,
        }
    }
}

// Anything outside Easy/Medium/Hard (including null) reads as Unknown.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Difficulty::parse).unwrap_or_default())
    }
}

/// One problem link scraped from a topic page, with the heading path that
/// was active where it appeared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRow {
    pub id: u32,
    pub title: String,
    pub slug: String,
    pub rating: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub is_premium: bool,
    pub url: String,

    pub ec_category: String,
    pub ec_section: String,
    pub ec_group: String,
    pub ec_sub_group: String,

    pub source_url: String,
}

/// Stable sort by ascending id; equal ids keep document order.
pub fn sort_rows(rows: &mut [ProblemRow]) {
    rows.sort_by_key(|r| r.id);
}

/// Drop repeated `(category, id)` pairs, keeping the first occurrence.
/// Returns the kept rows and how many were dropped.
pub fn dedup_rows(rows: Vec<ProblemRow>) -> (Vec<ProblemRow>, usize) {
    let before = rows.len();
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    let kept: Vec<ProblemRow> = rows
        .into_iter()
        .filter(|r| seen.insert((r.ec_category.clone(), r.id)))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Overwrite `path` with `rows` as a pretty-printed JSON array, creating the
/// parent directory when needed.
pub fn write_rows(path: &Path, rows: &[ProblemRow]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_rows(path: &Path) -> Result<Vec<ProblemRow>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid row file {}", path.display()))
}

pub struct RowStats {
    pub total: usize,
    pub unique_ids: usize,
    pub rated: usize,
    pub premium: usize,
    pub categories: usize,
}

impl RowStats {
    pub fn from_rows(rows: &[ProblemRow]) -> Self {
        RowStats {
            total: rows.len(),
            unique_ids: rows.iter().map(|r| r.id).collect::<HashSet<_>>().len(),
            rated: rows.iter().filter(|r| r.rating.is_some()).count(),
            premium: rows.iter().filter(|r| r.is_premium).count(),
            categories: rows
                .iter()
                .map(|r| r.ec_category.as_str())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

#[cfg(test)]
pub(crate) fn row(id: u32, category: &str) -> ProblemRow {
    ProblemRow {
        id,
        title: format!("Problem {}", id),
        slug: format!("problem-{}", id),
        rating: None,
        difficulty: None,
        is_premium: false,
        url: format!("https://leetcode.cn/problems/problem-{}/", id),
        ec_category: category.to_string(),
        ec_section: "General".to_string(),
        ec_group: "General".to_string(),
        ec_sub_group: "General".to_string(),
        source_url: "https://leetcode.cn/circle/discuss/test/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable_on_equal_ids() {
        let mut rows = vec![row(9, "A"), row(3, "A"), row(9, "B"), row(1, "B")];
        sort_rows(&mut rows);
        let order: Vec<_> = rows.iter().map(|r| (r.id, r.ec_category.as_str())).collect();
        assert_eq!(order, vec![(1, "B"), (3, "A"), (9, "A"), (9, "B")]);
    }

    #[test]
    fn dedup_is_per_category() {
        let mut second = row(1, "A");
        second.ec_section = "Later".into();
        let (rows, dropped) = dedup_rows(vec![row(1, "A"), row(1, "B"), second, row(2, "A")]);
        assert_eq!(dropped, 1);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.ec_section == "General"));
    }

    #[test]
    fn row_json_shape() {
        let mut r = row(42, "Sliding Window");
        r.rating = Some(1890);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["rating"], 1890);
        assert!(json["difficulty"].is_null());
        assert_eq!(json["ec_category"], "Sliding Window");
        assert_eq!(json["source_url"], "https://leetcode.cn/circle/discuss/test/");
    }

    #[test]
    fn difficulty_parsing() {
        let d: Difficulty = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
        let d: Difficulty = serde_json::from_str("\"Insane\"").unwrap();
        assert_eq!(d, Difficulty::Unknown);
        let d: Option<Difficulty> = serde_json::from_str("null").unwrap();
        assert_eq!(d, None);
    }

    #[test]
    fn write_then_read_creates_directory() {
        let dir = std::env::temp_dir().join(format!("galaxy-rows-{}", std::process::id()));
        let path = dir.join("nested").join("rows.json");
        let rows = vec![row(1, "A"), row(2, "A")];
        write_rows(&path, &rows).unwrap();
        // Second write overwrites, never appends.
        write_rows(&path, &rows[..1]).unwrap();
        let back = read_rows(&path).unwrap();
        assert_eq!(back, rows[..1].to_vec());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn stats_count_unique_and_flags() {
        let mut a = row(1, "A");
        a.rating = Some(1500);
        let mut b = row(1, "B");
        b.is_premium = true;
        let s = RowStats::from_rows(&[a, b, row(2, "A")]);
        assert_eq!((s.total, s.unique_ids, s.rated, s.premium, s.categories), (3, 2, 1, 1, 2));
    }
}
