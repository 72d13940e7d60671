use super::nodes::{Link, Node};

pub const DEFAULT_HEADING: &str = "General";

/// Heading path active at a point in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub section: String,
    pub group: String,
    pub sub_group: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            section: DEFAULT_HEADING.to_string(),
            group: DEFAULT_HEADING.to_string(),
            sub_group: DEFAULT_HEADING.to_string(),
        }
    }
}

impl Context {
    /// H2 starts a section, H3 a group, H4 a sub-group. A heading resets
    /// every level below it.
    pub fn apply(&self, level: u8, title: &str) -> Context {
        let title = heading_title(title);
        match level {
            2 => Context {
                section: title,
                ..Context::default()
            },
            3 => Context {
                section: self.section.clone(),
                group: title,
                sub_group: DEFAULT_HEADING.to_string(),
            },
            4 => Context {
                sub_group: title,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

pub fn heading_title(raw: &str) -> String {
    raw.trim().trim_start_matches('§').trim().to_string()
}

/// A list item together with the heading path it appeared under.
#[derive(Debug)]
pub struct Placed<'a> {
    pub context: Context,
    pub text: &'a str,
    pub link: Option<&'a Link>,
}

/// Prose found directly under a section (H2) or group (H3) heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub category: String,
    pub section: String,
    pub group: Option<String>,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Outline<'a> {
    pub items: Vec<Placed<'a>>,
    pub descriptions: Vec<Description>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Section,
    Group,
}

const MIN_DESCRIPTION_CHARS: usize = 6;

struct Walk<'a> {
    category: &'a str,
    context: Context,
    target: Option<Target>,
    outline: Outline<'a>,
}

impl<'a> Walk<'a> {
    fn step(mut self, node: &'a Node) -> Self {
        match node {
            Node::Heading { level, text } => {
                self.context = self.context.apply(*level, text);
                self.target = match level {
                    2 => Some(Target::Section),
                    3 => Some(Target::Group),
                    _ => None,
                };
            }
            Node::Paragraph(text) => {
                if let Some(target) = self.target {
                    if text.chars().count() >= MIN_DESCRIPTION_CHARS {
                        self.describe(target, text);
                    }
                }
            }
            Node::Item { text, link } => {
                self.target = None;
                self.outline.items.push(Placed {
                    context: self.context.clone(),
                    text,
                    link: link.as_ref(),
                });
            }
        }
        self
    }

    fn describe(&mut self, target: Target, text: &str) {
        let group = match target {
            Target::Section => None,
            Target::Group => Some(self.context.group.clone()),
        };
        let descriptions = &mut self.outline.descriptions;
        match descriptions
            .last_mut()
            .filter(|d| d.section == self.context.section && d.group == group)
        {
            Some(last) => {
                last.text.push('\n');
                last.text.push_str(text);
            }
            None => descriptions.push(Description {
                category: self.category.to_string(),
                section: self.context.section.clone(),
                group,
                text: text.to_string(),
            }),
        }
    }
}

/// Fold the node stream into placed items and heading descriptions.
pub fn place<'a>(nodes: &'a [Node], category: &'a str) -> Outline<'a> {
    let start = Walk {
        category,
        context: Context::default(),
        target: None,
        outline: Outline::default(),
    };
    nodes.iter().fold(start, Walk::step).outline
}
