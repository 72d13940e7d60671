//! Flat rows → hierarchical document: category → section → group, with the
//! sub-group carried as a problem tag. Headings and descriptions are
//! translated; the source text is kept in the `*_zh` fields.

use std::collections::HashMap;

use super::translate::Translations;
use super::{Problem, Section, Subtopic, Topic};
use crate::catalog;
use crate::parser::outline::{Description, DEFAULT_HEADING};
use crate::rows::ProblemRow;

/// Build topics from rows in document order. Topics, sections and
/// subtopics appear in the order their first row does.
pub fn assemble(
    rows: &[ProblemRow],
    descriptions: &[Description],
    translations: &Translations,
) -> Vec<Topic> {
    let mut topics: Vec<Topic> = Vec::new();
    let mut by_category: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let t = *by_category
            .entry(row.ec_category.as_str())
            .or_insert_with(|| {
                topics.push(new_topic(&row.ec_category));
                topics.len() - 1
            });

        let section = section_mut(&mut topics[t].sections, row, descriptions, translations);
        let problems = if row.ec_group == DEFAULT_HEADING {
            &mut section.problems
        } else {
            let sub = subtopic_mut(&mut section.subtopics, row, descriptions, translations);
            &mut sub.problems
        };

        let problem = to_problem(row);
        if !problems.iter().any(|p| p.id == problem.id) {
            problems.push(problem);
        }
    }

    topics
}

fn new_topic(category: &str) -> Topic {
    Topic {
        id: catalog::topic_id(category),
        group: category.to_uppercase(),
        title: category.to_string(),
        sections: Vec::new(),
    }
}

fn section_mut<'a>(
    sections: &'a mut Vec<Section>,
    row: &ProblemRow,
    descriptions: &[Description],
    translations: &Translations,
) -> &'a mut Section {
    let heading = row.ec_section.as_str();
    let i = match sections.iter().position(|s| s.title_zh.as_deref() == Some(heading)) {
        Some(i) => i,
        None => {
            let (description, description_zh) =
                describe(descriptions, translations, &row.ec_category, heading, None);
            sections.push(Section {
                title: translations.title(heading),
                title_zh: Some(heading.to_string()),
                description,
                description_zh,
                subtopics: Vec::new(),
                problems: Vec::new(),
            });
            sections.len() - 1
        }
    };
    &mut sections[i]
}

fn subtopic_mut<'a>(
    subtopics: &'a mut Vec<Subtopic>,
    row: &ProblemRow,
    descriptions: &[Description],
    translations: &Translations,
) -> &'a mut Subtopic {
    let heading = row.ec_group.as_str();
    let i = match subtopics.iter().position(|s| s.title_zh.as_deref() == Some(heading)) {
        Some(i) => i,
        None => {
            let (description, description_zh) = describe(
                descriptions,
                translations,
                &row.ec_category,
                &row.ec_section,
                Some(heading),
            );
            subtopics.push(Subtopic {
                title: translations.title(heading),
                title_zh: Some(heading.to_string()),
                description,
                description_zh,
                problems: Vec::new(),
            });
            subtopics.len() - 1
        }
    };
    &mut subtopics[i]
}

/// `(translated, source)` description for a heading, when the page had one.
fn describe(
    descriptions: &[Description],
    translations: &Translations,
    category: &str,
    section: &str,
    group: Option<&str>,
) -> (Option<String>, Option<String>) {
    match descriptions
        .iter()
        .find(|d| d.category == category && d.section == section && d.group.as_deref() == group)
    {
        Some(d) => (Some(translations.description(&d.text)), Some(d.text.clone())),
        None => (None, None),
    }
}

fn to_problem(row: &ProblemRow) -> Problem {
    Problem {
        id: row.id.to_string(),
        title: row.title.clone(),
        slug: row.slug.clone(),
        rating: row.rating,
        difficulty: row.difficulty.unwrap_or_default(),
        is_premium: row.is_premium,
        is_predicted: None,
        tags: catalog::sub_group_tag(&row.ec_sub_group)
            .map(|tag| vec![tag.to_string()])
            .unwrap_or_default(),
        url: row.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{extract_document, Source};
    use crate::rows::{dedup_rows, row, Difficulty};
    use crate::taxonomy::adapter::{adapt, AdapterRules};
    use std::path::Path;

    fn placed(id: u32, category: &str, section: &str, group: &str, sub_group: &str) -> ProblemRow {
        let mut r = row(id, category);
        r.ec_section = section.into();
        r.ec_group = group.into();
        r.ec_sub_group = sub_group.into();
        r
    }

    #[test]
    fn general_group_goes_on_the_section() {
        let rows = vec![
            placed(1, "Greedy", "S1", "General", "General"),
            placed(2, "Greedy", "S1", "G1", "基础"),
            placed(3, "Greedy", "S1", "G1", "进阶"),
            placed(4, "Greedy", "S2", "General", "思维题"),
            placed(5, "Math", "S1", "General", "General"),
        ];
        let topics = assemble(&rows, &[], &Translations::default());
        assert_eq!(topics.len(), 2);

        let greedy = &topics[0];
        assert_eq!((greedy.id.as_str(), greedy.group.as_str()), ("greedy", "GREEDY"));
        assert_eq!(greedy.sections.len(), 2);
        assert_eq!(greedy.sections[0].problems[0].id, "1");
        assert!(greedy.sections[0].problems[0].tags.is_empty());

        let g1 = &greedy.sections[0].subtopics[0];
        assert_eq!(g1.title, "G1");
        assert_eq!(g1.problems[0].tags, vec!["CORE".to_string()]);
        assert_eq!(g1.problems[1].tags, vec!["ADVANCED".to_string()]);
        assert_eq!(greedy.sections[1].problems[0].tags, vec!["THINKING".to_string()]);

        assert_eq!(topics[1].id, "math");
        assert_eq!(greedy.problem_count() + topics[1].problem_count(), rows.len());
    }

    #[test]
    fn problem_fields_carry_over() {
        let mut r = placed(42, "Sliding Window", "S", "General", "General");
        r.rating = Some(1890);
        r.is_premium = true;
        let topics = assemble(&[r.clone(), r], &[], &Translations::default());
        let p = &topics[0].sections[0].problems;
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].id, "42");
        assert_eq!(p[0].rating, Some(1890));
        assert!(p[0].is_premium);
        assert_eq!(p[0].difficulty, Difficulty::Unknown);
        assert_eq!(p[0].url, "https://leetcode.cn/problems/problem-42/");
    }

    #[test]
    fn data_structures_page_end_to_end() {
        let html = std::fs::read_to_string("tests/fixtures/data_structures.html").unwrap();
        let ex = extract_document(&html, &Source::from_stem("data_structures"));
        let (rows, dropped) = dedup_rows(ex.rows);
        assert_eq!(dropped, 1);

        let topics = assemble(&rows, &ex.descriptions, &Translations::default());
        assert_eq!(topics.len(), 1);
        let ds = &topics[0];
        assert_eq!(ds.id, "data-structures");
        let titles: Vec<&str> = ds.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Common Enumeration", "Prefix Sum", "Trie"]);
        assert_eq!(ds.sections[0].title_zh.as_deref(), Some("0 Common Enumeration"));
        assert_eq!(
            ds.sections[0].description.as_deref(),
            Some("Enumerate the right end and maintain the left.")
        );

        let basics = &ds.sections[1].subtopics[0];
        assert_eq!(basics.title, "Basics");
        assert_eq!(basics.title_zh.as_deref(), Some("1.1 Basics"));
        assert_eq!(basics.description.as_deref(), Some("Prefix sums turn range queries into differences."));
        let ids: Vec<&str> = basics.problems.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["303", "560"]);
        assert_eq!(basics.problems[1].tags, vec!["CORE".to_string()]);
        assert!(ds.sections[2].problems[1].is_premium);

        let roadmap = adapt(&topics, &AdapterRules::default());
        let ids: Vec<&str> = roadmap.topics.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["core-data-structures", "advanced-data-structures"]);
        assert_eq!(roadmap.topics[0].problem_count(), 4);
        assert_eq!(roadmap.topics[1].problem_count(), 2);
        assert_eq!(roadmap.total_problems, 6);
    }

    #[test]
    fn chinese_headings_are_translated_before_the_split() {
        let html = std::fs::read_to_string("tests/fixtures/data_structures_zh.html").unwrap();
        let ex = extract_document(&html, &Source::from_stem("data_structures"));
        let (rows, _) = dedup_rows(ex.rows);
        let translations = Translations::load(Path::new("tests/fixtures/translations.json")).unwrap();

        let topics = assemble(&rows, &ex.descriptions, &translations);
        let ds = &topics[0];
        let titles: Vec<&str> = ds.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Common Enumeration", "Prefix Sum", "Trie"]);
        let zh: Vec<&str> = ds.sections.iter().filter_map(|s| s.title_zh.as_deref()).collect();
        assert_eq!(zh, vec!["0 常用枚举技巧", "1 前缀和", "6 字典树"]);

        let first = &ds.sections[0];
        assert_eq!(
            first.description.as_deref(),
            Some("Enumerate the right, maintain the left. For two-variable problems, enumerate one of them.")
        );
        assert_eq!(
            first.description_zh.as_deref(),
            Some("枚举右，维护左。对于双变量问题，通常枚举其中一个变量。")
        );

        let basics = &ds.sections[1].subtopics[0];
        assert_eq!(basics.title, "Prefix Sum Basics");
        assert_eq!(basics.title_zh.as_deref(), Some("1.1 前缀和基础"));
        assert_eq!(basics.problems[1].tags, vec!["CORE".to_string()]);

        let roadmap = adapt(&topics, &AdapterRules::default());
        let ids: Vec<&str> = roadmap.topics.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["core-data-structures", "advanced-data-structures"]);
        assert_eq!(roadmap.topics[0].problem_count(), 3);
        assert_eq!(roadmap.topics[1].problem_count(), 1);
    }
}
