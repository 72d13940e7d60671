use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Structural element of a topic page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading { level: u8, text: String },
    /// A list item: its full text and first link.
    Item { text: String, link: Option<Link> },
    Paragraph(String),
}

#[derive(Debug)]
pub struct Scan {
    pub nodes: Vec<Node>,
    /// Tokenizer error that ended the scan early. Nodes before it are kept.
    pub error: Option<String>,
}

/// Elements whose start implicitly ends an open paragraph.
const BLOCK_ELEMENTS: &[&[u8]] = &[
    b"p", b"blockquote", b"div", b"section", b"ul", b"ol", b"li", b"dl", b"table", b"pre",
    b"hr", b"h1", b"h2", b"h3", b"h4", b"h5", b"h6",
];
const RAW_TEXT_ELEMENTS: &[&[u8]] = &[b"script", b"style"];
const ZERO_WIDTH: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];
const MAX_REFERENCE_LEN: usize = 32;

/// Classify the children of the first element carrying `container_class`.
/// Returns `None` when no such element exists.
pub fn scan(html: &str, container_class: &str) -> Option<Scan> {
    let html = escape_stray_lt(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut collector: Option<Collector> = None;

    loop {
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(e) => {
                let error = format!("{} (byte {})", e, reader.buffer_position());
                return collector.map(|c| c.finish(Some(error)));
            }
        };

        if let Event::Start(start) = &event {
            if RAW_TEXT_ELEMENTS.contains(&tag_name(start).as_slice()) {
                if let Err(e) = reader.read_to_end(start.name()) {
                    let error = format!("{} (byte {})", e, reader.buffer_position());
                    return collector.map(|c| c.finish(Some(error)));
                }
                continue;
            }
        }

        match collector.as_mut() {
            Some(c) => {
                if c.handle(event) {
                    break;
                }
            }
            None => {
                if let Event::Start(start) = &event {
                    if has_class(start, container_class) {
                        collector = Some(Collector::new(tag_name(start)));
                    }
                }
            }
        }
    }

    collector.map(|c| c.finish(None))
}

struct OpenItem {
    slot: usize,
    list_depth: usize,
    text: String,
    anchor: Option<Link>,
    link: Option<Link>,
}

struct Collector {
    /// Tag name of the container and how many elements of that name are open.
    container: Vec<u8>,
    open_containers: usize,
    nodes: Vec<Node>,
    list_depth: usize,
    items: Vec<OpenItem>,
    heading: Option<(u8, String)>,
    paragraph: Option<String>,
}

impl Collector {
    fn new(container: Vec<u8>) -> Self {
        Self {
            container,
            open_containers: 1,
            nodes: Vec::new(),
            list_depth: 0,
            items: Vec::new(),
            heading: None,
            paragraph: None,
        }
    }

    /// Returns true once the container element has closed.
    fn handle(&mut self, event: Event<'_>) -> bool {
        match event {
            Event::Start(start) => {
                let name = tag_name(&start);
                if name == self.container {
                    self.open_containers += 1;
                }
                self.open(&name, &start);
            }
            // `<a href=/x/>` with an unquoted value reads as self-closing.
            Event::Empty(start) => {
                let name = tag_name(&start);
                if name == b"a" {
                    self.open(&name, &start);
                } else if BLOCK_ELEMENTS.contains(&name.as_slice()) {
                    self.flush_paragraph();
                }
            }
            Event::End(end) => {
                let name = end.local_name().as_ref().to_ascii_lowercase();
                if name == self.container {
                    self.open_containers -= 1;
                    if self.open_containers == 0 {
                        return true;
                    }
                }
                self.close(&name);
            }
            Event::Text(text) => self.text(&unescape_html(&String::from_utf8_lossy(&text))),
            Event::CData(data) => self.text(&String::from_utf8_lossy(&data)),
            _ => {}
        }
        false
    }

    fn open(&mut self, name: &[u8], start: &BytesStart<'_>) {
        if BLOCK_ELEMENTS.contains(&name) {
            self.flush_paragraph();
        }
        match name {
            b"h2" | b"h3" | b"h4" => self.heading = Some((name[1] - b'0', String::new())),
            b"ul" | b"ol" => self.list_depth += 1,
            b"li" => {
                // An unclosed sibling <li> ends where the next one starts.
                self.close_items(self.list_depth.max(1));
                self.nodes.push(Node::Item {
                    text: String::new(),
                    link: None,
                });
                self.items.push(OpenItem {
                    slot: self.nodes.len() - 1,
                    list_depth: self.list_depth.max(1),
                    text: String::new(),
                    anchor: None,
                    link: None,
                });
            }
            b"a" => {
                if let Some(item) = self.items.last_mut() {
                    if item.link.is_none() && item.anchor.is_none() {
                        item.anchor = Some(Link {
                            href: attribute(start, b"href").unwrap_or_default(),
                            text: String::new(),
                        });
                    }
                }
            }
            b"p" | b"blockquote" if self.items.is_empty() && self.heading.is_none() => {
                self.paragraph = Some(String::new());
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"h2" | b"h3" | b"h4" => {
                if let Some((level, text)) = self.heading.take() {
                    self.nodes.push(Node::Heading {
                        level,
                        text: normalize_ws(&text),
                    });
                }
            }
            b"li" => {
                if let Some(item) = self.items.pop() {
                    self.emit(item);
                }
            }
            b"ul" | b"ol" => {
                self.close_items(self.list_depth.max(1));
                self.list_depth = self.list_depth.saturating_sub(1);
            }
            b"a" => {
                if let Some(item) = self.items.last_mut() {
                    if let Some(anchor) = item.anchor.take() {
                        item.link = Some(Link {
                            text: normalize_ws(&anchor.text),
                            href: anchor.href,
                        });
                    }
                }
            }
            b"p" | b"blockquote" => self.flush_paragraph(),
            _ => {}
        }
    }

    fn text(&mut self, s: &str) {
        if let Some((_, heading)) = self.heading.as_mut() {
            heading.push_str(s);
        }
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_str(s);
        }
        for item in &mut self.items {
            item.text.push_str(s);
            if let Some(anchor) = item.anchor.as_mut() {
                anchor.text.push_str(s);
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if let Some(text) = self.paragraph.take() {
            let text = normalize_ws(&text);
            if !text.is_empty() {
                self.nodes.push(Node::Paragraph(text));
            }
        }
    }

    /// Close items left open at `depth` or deeper.
    fn close_items(&mut self, depth: usize) {
        while self.items.last().is_some_and(|item| item.list_depth >= depth) {
            if let Some(item) = self.items.pop() {
                self.emit(item);
            }
        }
    }

    fn emit(&mut self, item: OpenItem) {
        let link = item.link.or_else(|| {
            item.anchor.map(|a| Link {
                text: normalize_ws(&a.text),
                href: a.href,
            })
        });
        self.nodes[item.slot] = Node::Item {
            text: normalize_ws(&item.text),
            link,
        };
    }

    fn finish(mut self, error: Option<String>) -> Scan {
        self.close_items(0);
        self.flush_paragraph();
        if let Some((level, text)) = self.heading.take() {
            self.nodes.push(Node::Heading {
                level,
                text: normalize_ws(&text),
            });
        }
        Scan {
            nodes: self.nodes,
            error,
        }
    }
}

fn tag_name(start: &BytesStart<'_>) -> Vec<u8> {
    start.local_name().as_ref().to_ascii_lowercase()
}

fn has_class(start: &BytesStart<'_>, class: &str) -> bool {
    attribute(start, b"class").is_some_and(|v| v.split_whitespace().any(|c| c == class))
}

fn attribute(start: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .html_attributes()
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(key))
        .map(|a| unescape_html(&String::from_utf8_lossy(&a.value)))
}

/// A `<` that cannot open a tag (`i < j`) is text in HTML; escape it so the
/// tokenizer does not read the rest of the line as markup.
fn escape_stray_lt(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    for (i, c) in html.char_indices() {
        let opens_tag = c == '<'
            && html[i + 1..]
                .starts_with(|n: char| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));
        if c == '<' && !opens_tag {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode character references. Unknown or malformed ones are kept as
/// written and decoding carries on after them.
fn unescape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let resolved = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_REFERENCE_LEN)
            .and_then(|end| resolve_reference(&rest[1..=end]).map(|value| (end, value)));
        match resolved {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &rest[end + 2..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_reference(name: &str) -> Option<String> {
    match name.strip_prefix('#') {
        Some(number) => {
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code).map(String::from)
        }
        None => resolve_html5_entity(name).map(str::to_string),
    }
}

/// Collapse whitespace runs and drop zero-width characters.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace()
        .map(|word| word.replace(ZERO_WIDTH, ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(body: &str) -> Vec<Node> {
        let html = format!(
            "<html><body><nav><ul><li><a href=\"/problems/nav/\">1. Nav</a></li></ul></nav>\
             <div class=\"markdown break-words\">{}</div><ul><li>after</li></ul></body></html>",
            body
        );
        scan(&html, "break-words").expect("container").nodes
    }

    #[test]
    fn missing_container() {
        assert!(scan("<html><body><p>hi</p></body></html>", "break-words").is_none());
    }

    #[test]
    fn headings_and_items_in_order() {
        let got = nodes(
            "<h2>§1 Arrays</h2><p>Intro text here</p>\
             <ul><li><a href=\"/problems/two-sum/\">1. Two Sum</a> 1161</li></ul>",
        );
        assert_eq!(
            got,
            vec![
                Node::Heading { level: 2, text: "§1 Arrays".into() },
                Node::Paragraph("Intro text here".into()),
                Node::Item {
                    text: "1. Two Sum 1161".into(),
                    link: Some(Link { href: "/problems/two-sum/".into(), text: "1. Two Sum".into() }),
                },
            ]
        );
    }

    #[test]
    fn only_first_container_is_scanned() {
        let got = nodes("<h3>Inner</h3>");
        assert_eq!(got, vec![Node::Heading { level: 3, text: "Inner".into() }]);
    }

    #[test]
    fn unclosed_items_and_void_elements() {
        let got = nodes("<ul><li>a<br>one<li>b<img src=x>two</ul><h4>Next</h4>");
        assert_eq!(
            got,
            vec![
                Node::Item { text: "aone".into(), link: None },
                Node::Item { text: "btwo".into(), link: None },
                Node::Heading { level: 4, text: "Next".into() },
            ]
        );
    }

    #[test]
    fn nested_lists_keep_document_order() {
        let got = nodes(
            "<ul><li><a href=\"/problems/a/\">1. A</a><ul><li><a href=\"/problems/b/\">2. B</a></li></ul></li></ul>",
        );
        assert_eq!(got.len(), 2);
        assert!(matches!(&got[0], Node::Item { link: Some(l), text } if l.text == "1. A" && text == "1. A2. B"));
        assert!(matches!(&got[1], Node::Item { link: Some(l), .. } if l.text == "2. B"));
    }

    #[test]
    fn entities_are_decoded() {
        let got = nodes("<ul><li><a href=\"/problems/x/?a=1&amp;b=2\">3.&nbsp;X &amp; Y</a></li></ul>");
        assert!(matches!(&got[0], Node::Item { link: Some(l), .. }
            if l.text == "3. X & Y" && l.href == "/problems/x/?a=1&b=2"));
    }

    #[test]
    fn scripts_are_skipped() {
        let got = nodes("<script>var t = \"<h2>Fake</h2>\";</script><h2>After</h2>");
        assert_eq!(got, vec![Node::Heading { level: 2, text: "After".into() }]);
    }

    #[test]
    fn unknown_and_numeric_references() {
        let got = nodes("<ul><li>AT&T &foo; &lt;b&gt; &#65;&#x42; caf&eacute;</li></ul>");
        assert_eq!(got, vec![Node::Item { text: "AT&T &foo; <b> AB café".into(), link: None }]);
    }

    #[test]
    fn unclosed_paragraph_does_not_leak_past_container() {
        let html = "<div class=\"break-words\"><p>intro<ul>\
                    <li><a href=\"/problems/a/\">1. A</a></li></ul></div>\
                    <div class=\"comments\"><ul><li><a href=\"/problems/spam/\">2. Spam</a></li></ul></div>";
        let got = scan(html, "break-words").unwrap().nodes;
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], Node::Paragraph("intro".into()));
        assert!(matches!(&got[1], Node::Item { link: Some(l), .. } if l.text == "1. A"));
    }

    #[test]
    fn nested_container_tags_close_by_name() {
        let got = nodes("<div><h2>Inside</h2></div><div><p>Still inside</p></div>");
        assert_eq!(
            got,
            vec![
                Node::Heading { level: 2, text: "Inside".into() },
                Node::Paragraph("Still inside".into()),
            ]
        );
    }

    #[test]
    fn bare_less_than_stays_text() {
        let got = nodes("<ul><li><a href=\"/problems/a/\">1. A</a> i < j 1500</li><li>x <3</li></ul>");
        assert_eq!(got.len(), 2);
        assert!(matches!(&got[0], Node::Item { text, .. } if text == "1. A i < j 1500"));
        assert!(matches!(&got[1], Node::Item { text, .. } if text == "x <3"));
    }

    #[test]
    fn unquoted_self_closing_anchor_keeps_link() {
        let got = nodes("<ul><li><a href=/problems/a/>1. A</a> 1500</li></ul>");
        assert!(matches!(&got[0], Node::Item { link: Some(l), .. }
            if l.text == "1. A" && l.href.starts_with("/problems/a")));
    }

    #[test]
    fn zero_width_characters_are_dropped() {
        let got = nodes("<ul><li>4. Sum&#8203;s \u{feff} 1500</li></ul>");
        assert_eq!(got, vec![Node::Item { text: "4. Sums 1500".into(), link: None }]);
        assert_eq!(normalize_ws("a\u{200c}b \u{200d} c"), "ab c");
    }
}
