//! Static lookup tables: scraper buckets, topic-file categories and
//! sub-group tags.

/// An independent scraper output partition: one raw folder, one JSON file.
#[derive(Debug, PartialEq, Eq)]
pub struct Bucket {
    pub name: &'static str,
    pub output: &'static str,
}

pub const BUCKETS: &[Bucket] = &[
    Bucket {
        name: "fundamentals",
        output: "galaxy_fundamentals.json",
    },
    Bucket {
        name: "full-practice",
        output: "galaxy_full.json",
    },
];

/// Bucket the hierarchical taxonomy document is assembled from.
pub const GRAPH_BUCKET: &str = "full-practice";

pub fn find_bucket(name: &str) -> Option<&'static Bucket> {
    BUCKETS.iter().find(|b| b.name == name)
}

struct Category {
    stem: &'static str,
    topic_id: &'static str,
    name: &'static str,
}

const CATEGORIES: &[Category] = &[
    Category { stem: "data_structures", topic_id: "data-structures", name: "Data Structures" },
    Category { stem: "math", topic_id: "math", name: "Math" },
    Category { stem: "dp", topic_id: "dp", name: "Dynamic Programming" },
    Category { stem: "graph", topic_id: "graph", name: "Graph Theory" },
    Category { stem: "greedy", topic_id: "greedy", name: "Greedy" },
    Category { stem: "string", topic_id: "strings", name: "Strings" },
    Category { stem: "linked_list", topic_id: "linked-list-tree", name: "Linked List" },
    Category { stem: "sliding_window", topic_id: "sliding-window", name: "Sliding Window" },
    Category { stem: "binary_search", topic_id: "binary-search", name: "Binary Search" },
    Category { stem: "monotonic_stack", topic_id: "monotonic-stack", name: "Monotonic Stack" },
    Category { stem: "grid", topic_id: "grid-graph", name: "Grid Graph" },
    Category { stem: "bitwise", topic_id: "bitwise", name: "Bitwise" },
];

const SITE_ORIGIN: &str = "https://leetcode.cn";

/// Display name for a topic file stem; unknown stems are prettified
/// (`union_find` → `Union Find`).
pub fn category_name(stem: &str) -> String {
    CATEGORIES
        .iter()
        .find(|c| c.stem == stem)
        .map(|c| c.name.to_string())
        .unwrap_or_else(|| title_case(&stem.replace('_', " ")))
}

/// Topic identifier for a category display name, falling back to a
/// kebab-case slug of the name.
pub fn topic_id(category: &str) -> String {
    CATEGORIES
        .iter()
        .find(|c| c.name == category)
        .map(|c| c.topic_id.to_string())
        .unwrap_or_else(|| kebab_case(category))
}

pub fn source_url(stem: &str) -> String {
    format!("{}/circle/discuss/{}/", SITE_ORIGIN, stem)
}

/// Absolute problem URL for an href found in a topic page.
pub fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", SITE_ORIGIN, href)
    } else {
        format!("{}/{}", SITE_ORIGIN, href)
    }
}

const SUB_GROUP_TAGS: &[(&str, &str)] = &[
    ("基础", "CORE"),
    ("进阶", "ADVANCED"),
    ("选做", "OPTIONAL"),
    ("思维题", "THINKING"),
];

/// Importance tag carried by an H4 sub-group title, if any.
pub fn sub_group_tag(title: &str) -> Option<&'static str> {
    SUB_GROUP_TAGS
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map(|(_, tag)| *tag)
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_word = false;
    for c in s.chars() {
        if c.is_alphanumeric() && !prev_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_word = c.is_alphanumeric();
    }
    out
}

fn kebab_case(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
