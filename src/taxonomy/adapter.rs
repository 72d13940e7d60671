use std::collections::HashMap;

use tracing::debug;

use super::{Problem, Section, Subtopic, Topic};

const SPLIT_SOURCE: &str = "data-structures";

const CORE_KEYWORDS: &[&str] = &[
    "Common Enumeration",
    "Prefix Sum",
    "Difference Array",
    "Stack",
    "Queue",
    "Heap",
    "Union-Find",
];

/// "Road to 2000" sequence.
const TOPIC_ORDER: &[&str] = &[
    "sliding-window",
    "binary-search",
    "core-data-structures",
    "advanced-data-structures",
    "monotonic-stack",
    "linked-list-tree",
    "grid-graph",
    "graph",
    "dp",
    "greedy",
    "bitwise",
    "math",
    "strings",
];

const TOPIC_TITLES: &[(&str, &str)] = &[
    ("binary-search", "Binary Search"),
    ("sliding-window", "Sliding Window"),
    ("core-data-structures", "Core Data Structures"),
    ("advanced-data-structures", "Advanced Data Structures"),
    ("monotonic-stack", "Monotonic Stack"),
    ("linked-list-tree", "Linked List & Trees"),
    ("grid-graph", "Grid DFS/BFS"),
    ("graph", "Graph Algorithms"),
    ("dp", "Dynamic Programming"),
    ("greedy", "Greedy"),
    ("bitwise", "Bit Manipulation"),
    ("math", "Math & Combinatorics"),
    ("strings", "String Algorithms"),
];

const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems";

/// Identity of one half of a split topic.
#[derive(Debug, Clone)]
pub struct Branch {
    pub id: String,
    pub group: String,
    pub title: String,
}

/// Everything the adapter decides by table. `Default` carries the live
/// roadmap tables.
#[derive(Debug, Clone)]
pub struct AdapterRules {
    pub split_source: String,
    pub core_keywords: Vec<String>,
    pub core: Branch,
    pub advanced: Branch,
    pub order: Vec<String>,
    pub titles: HashMap<String, String>,
}

impl Default for AdapterRules {
    fn default() -> Self {
        Self {
            split_source: SPLIT_SOURCE.to_string(),
            core_keywords: CORE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            core: Branch {
                id: "core-data-structures".into(),
                group: "CORE DATA STRUCTURES".into(),
                title: "Core Data Structures".into(),
            },
            advanced: Branch {
                id: "advanced-data-structures".into(),
                group: "ADVANCED DATA STRUCTURES".into(),
                title: "Advanced Data Structures".into(),
            },
            order: TOPIC_ORDER.iter().map(|s| s.to_string()).collect(),
            titles: TOPIC_TITLES
                .iter()
                .map(|(id, title)| (id.to_string(), title.to_string()))
                .collect(),
        }
    }
}

/// Display-ready view of a taxonomy document.
#[derive(Debug, Clone)]
pub struct Roadmap {
    pub topics: Vec<Topic>,
    pub total_problems: usize,
}

/// A section is "core" when its title contains any of `keywords`.
pub fn is_core_section<K: AsRef<str>>(title: &str, keywords: &[K]) -> bool {
    keywords.iter().any(|kw| title.contains(kw.as_ref()))
}

/// Partition sections into (core, advanced); every section lands in
/// exactly one side, in input order.
pub fn split_sections<K: AsRef<str>>(
    sections: &[Section],
    keywords: &[K],
) -> (Vec<Section>, Vec<Section>) {
    sections
        .iter()
        .cloned()
        .partition(|s| is_core_section(&s.title, keywords))
}

/// Position in the canonical sequence; unknown ids rank after all of it.
pub fn order_rank(id: &str, order: &[String]) -> usize {
    order.iter().position(|o| o == id).unwrap_or(order.len())
}

/// Split, retitle, order and filter the document's topics. The input is
/// left untouched.
pub fn adapt(document: &[Topic], rules: &AdapterRules) -> Roadmap {
    let mut topics: Vec<Topic> = Vec::with_capacity(document.len() + 1);

    for raw in document {
        if raw.id == rules.split_source {
            let (core, advanced) = split_sections(&raw.sections, rules.core_keywords.as_slice());
            debug!(
                "Split {} into {} core / {} advanced sections",
                raw.id,
                core.len(),
                advanced.len()
            );
            for (branch, sections) in [(&rules.core, core), (&rules.advanced, advanced)] {
                if !sections.is_empty() {
                    topics.push(present(&branch.id, &branch.group, &branch.title, &sections, rules));
                }
            }
        } else {
            topics.push(present(&raw.id, &raw.group, &raw.title, &raw.sections, rules));
        }
    }

    // Stable: unknown ids keep their input order behind the known ones.
    topics.sort_by_key(|t| order_rank(&t.id, &rules.order));
    topics.retain(|t| {
        let keep = t.has_problems();
        if !keep {
            debug!("Dropping empty topic {}", t.id);
        }
        keep
    });

    let total_problems = total_problems(&topics);
    Roadmap {
        topics,
        total_problems,
    }
}

/// Σ direct section problems + Σ subtopic problems.
pub fn total_problems(topics: &[Topic]) -> usize {
    topics.iter().map(Topic::problem_count).sum()
}

fn present(id: &str, group: &str, title: &str, sections: &[Section], rules: &AdapterRules) -> Topic {
    Topic {
        id: id.to_string(),
        group: group.to_string(),
        title: rules
            .titles
            .get(id)
            .cloned()
            .unwrap_or_else(|| title.to_string()),
        sections: sections
            .iter()
            .map(|s| Section {
                subtopics: s
                    .subtopics
                    .iter()
                    .map(|sub| Subtopic {
                        problems: sub.problems.iter().map(present_problem).collect(),
                        ..sub.clone()
                    })
                    .collect(),
                problems: s.problems.iter().map(present_problem).collect(),
                ..s.clone()
            })
            .collect(),
    }
}

fn present_problem(p: &Problem) -> Problem {
    let url = if p.slug.is_empty() {
        p.url.clone()
    } else {
        format!("{}/{}/", PROBLEM_URL_BASE, p.slug)
    };
    Problem { url, ..p.clone() }
}
