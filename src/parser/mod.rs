pub mod nodes;
pub mod outline;
pub mod problem;

use std::path::Path;

use tracing::warn;

use crate::catalog;
use crate::rows::ProblemRow;
use outline::Description;

/// Class of the element holding a topic page's rendered body.
pub const CONTENT_CLASS: &str = "break-words";

/// The topic file a document came from.
#[derive(Debug, Clone)]
pub struct Source {
    pub stem: String,
    pub category: String,
    pub source_url: String,
}

impl Source {
    pub fn from_stem(stem: &str) -> Self {
        Self {
            stem: stem.to_string(),
            category: catalog::category_name(stem),
            source_url: catalog::source_url(stem),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_stem(&stem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Complete,
    /// Markup error part-way through; rows before it were kept.
    Truncated,
    MissingContainer,
}

#[derive(Debug)]
pub struct Extraction {
    /// Rows in document order.
    pub rows: Vec<ProblemRow>,
    pub descriptions: Vec<Description>,
    pub status: DocumentStatus,
}

/// Three-pass pipeline: html → nodes → placed items → rows.
pub fn extract_document(html: &str, source: &Source) -> Extraction {
    let Some(scan) = nodes::scan(html, CONTENT_CLASS) else {
        warn!("No .{} container found in {}.html, skipping", CONTENT_CLASS, source.stem);
        return Extraction {
            rows: Vec::new(),
            descriptions: Vec::new(),
            status: DocumentStatus::MissingContainer,
        };
    };

    let status = match &scan.error {
        Some(e) => {
            warn!("Markup error in {}.html, keeping rows parsed so far: {}", source.stem, e);
            DocumentStatus::Truncated
        }
        None => DocumentStatus::Complete,
    };

    let outline = outline::place(&scan.nodes, &source.category);
    let rows = outline
        .items
        .iter()
        .filter_map(|placed| problem::parse_item(placed, source))
        .collect();

    Extraction {
        rows,
        descriptions: outline.descriptions,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::sort_rows;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    #[test]
    fn sliding_window_fixture() {
        let ex = extract_document(&fixture("sliding_window.html"), &Source::from_stem("sliding_window"));
        assert_eq!(ex.status, DocumentStatus::Complete);
        let ids: Vec<u32> = ex.rows.iter().map(|r| r.id).collect();
        // Document order; the external link, the unnumbered item and 4000 are dropped.
        assert_eq!(ids, vec![1456, 643, 2090, 42, 3, 7, 76, 1004]);

        let trap = ex.rows.iter().find(|r| r.id == 42).unwrap();
        assert_eq!(trap.title, "Trapping Rain Water");
        assert_eq!(trap.rating, Some(1890));
        assert!(trap.is_premium);
        assert_eq!(trap.slug, "trapping-rain-water");
        assert_eq!(trap.ec_section, "1 定长滑动窗口");
        assert_eq!(trap.ec_group, "1.2 进阶");
        assert_eq!(trap.ec_sub_group, "General");

        let reverse = ex.rows.iter().find(|r| r.id == 7).unwrap();
        assert_eq!(reverse.rating, None);
        assert_eq!(reverse.ec_sub_group, "基础");

        let first = &ex.rows[0];
        assert_eq!(first.ec_group, "General");
        assert_eq!(first.rating, Some(1263));

        assert!(ex.descriptions.iter().any(|d| d.group.is_none() && d.text.contains("窗口大小固定")));
    }

    #[test]
    fn fixture_rows_respect_bounds() {
        let ex = extract_document(&fixture("sliding_window.html"), &Source::from_stem("sliding_window"));
        let mut rows = ex.rows;
        sort_rows(&mut rows);
        assert!(rows.windows(2).all(|w| w[0].id <= w[1].id));
        for r in &rows {
            assert!(r.id > 0 && r.id <= problem::MAX_PROBLEM_ID);
            if let Some(rating) = r.rating {
                assert!(problem::RATING_RANGE.contains(&rating));
            }
        }
    }

    #[test]
    fn missing_container_yields_no_rows() {
        let ex = extract_document(&fixture("no_container.html"), &Source::from_stem("broken"));
        assert_eq!(ex.status, DocumentStatus::MissingContainer);
        assert!(ex.rows.is_empty());
    }

    #[test]
    fn rows_before_a_markup_error_are_kept() {
        let ex = extract_document(&fixture("truncated.html"), &Source::from_stem("binary_search"));
        assert_eq!(ex.status, DocumentStatus::Truncated);
        let ids: Vec<u32> = ex.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![704, 35]);
        assert_eq!(ex.rows[0].ec_section, "1 Basics");
    }

    #[test]
    fn source_from_path() {
        let s = Source::from_path(Path::new("raw/full-practice/data_structures.html"));
        assert_eq!(s.stem, "data_structures");
        assert_eq!(s.category, "Data Structures");
    }
}
