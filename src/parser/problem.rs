use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::outline::Placed;
use super::Source;
use crate::catalog;
use crate::rows::ProblemRow;

pub const PROBLEMS_PATH: &str = "/problems/";
/// Highest problem id the source lists; larger numbers are stray text.
pub const MAX_PROBLEM_ID: u32 = 3836;
pub const RATING_RANGE: Range<u32> = 1000..4000;
const PREMIUM_MARKERS: &[&str] = &["会员", "Plus"];

static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.").unwrap());
static ID_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());
static TRAILING_RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{3,4})\s*$").unwrap());
static INNER_RATING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s(\d{3,4})\s").unwrap());

/// Turn a placed list item into a row. Items that are not problem links
/// (or carry no usable id) are dropped.
pub fn parse_item(placed: &Placed<'_>, source: &Source) -> Option<ProblemRow> {
    let link = placed.link?;
    let Some(slug) = slug_from_href(&link.href) else {
        trace!("Skipping non-problem link: {}", link.href);
        return None;
    };
    let Some(id) = parse_id(&link.text) else {
        trace!("Skipping link without id prefix: {}", link.text);
        return None;
    };

    Some(ProblemRow {
        id,
        title: strip_id_prefix(&link.text),
        slug,
        rating: parse_rating(placed.text),
        difficulty: None,
        is_premium: is_premium(placed.text),
        url: catalog::absolute_url(&link.href),
        ec_category: source.category.clone(),
        ec_section: placed.context.section.clone(),
        ec_group: placed.context.group.clone(),
        ec_sub_group: placed.context.sub_group.clone(),
        source_url: source.source_url.clone(),
    })
}

/// Leading `N.` of a link text, when 1 ≤ N ≤ [`MAX_PROBLEM_ID`].
pub fn parse_id(link_text: &str) -> Option<u32> {
    let caps = ID_RE.captures(link_text.trim())?;
    caps[1]
        .parse::<u32>()
        .ok()
        .filter(|id| (1..=MAX_PROBLEM_ID).contains(id))
}

pub fn strip_id_prefix(link_text: &str) -> String {
    ID_PREFIX_RE.replace(link_text.trim(), "").trim().to_string()
}

/// A 3–4 digit token at the end of the item text, else one surrounded by
/// whitespace. The first token found decides; out-of-band values are dropped.
pub fn parse_rating(text: &str) -> Option<u32> {
    let caps = TRAILING_RATING_RE
        .captures(text)
        .or_else(|| INNER_RATING_RE.captures(text))?;
    caps[1].parse::<u32>().ok().filter(|r| RATING_RANGE.contains(r))
}

pub fn is_premium(text: &str) -> bool {
    PREMIUM_MARKERS.iter().any(|m| text.contains(m))
}

/// First path segment after `/problems/` in an href.
pub fn slug_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once(PROBLEMS_PATH)?;
    let slug = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}
