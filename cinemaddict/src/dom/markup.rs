//! Minimal markup scanner for the fixed templates the components produce.
//!
//! Supports quoted attributes, boolean attributes, void elements and
//! comments. Anything fancier (unquoted values, CDATA, entities) is passed
//! through as text.

use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s=/>]+(?:\s*=\s*"[^"]*")?)*)\s*(/?)>"#)
        .expect("valid tag pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>]+)(?:\s*=\s*"([^"]*)")?"#).expect("valid attribute pattern")
});

pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// Parsed markup tree
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Fragment>,
    },
    Text(String),
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Fragment>,
}

impl OpenElement {
    fn into_fragment(self) -> Fragment {
        Fragment::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

/// Parse markup into top-level fragments. Whitespace inside text is collapsed
/// and whitespace-only text is dropped.
pub fn parse(markup: &str) -> Vec<Fragment> {
    let markup = COMMENT.replace_all(markup, "");
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut roots: Vec<Fragment> = Vec::new();
    let mut last = 0;

    for caps in TAG.captures_iter(&markup) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut stack, &mut roots, &markup[last..whole.start()]);
        last = whole.end();

        let tag = caps[2].to_ascii_lowercase();
        if &caps[1] == "/" {
            // Stray closing tags are ignored
            if let Some(pos) = stack.iter().rposition(|open| open.tag == tag) {
                while stack.len() > pos {
                    if let Some(open) = stack.pop() {
                        push(&mut stack, &mut roots, open.into_fragment());
                    }
                }
            }
            continue;
        }

        let element = OpenElement {
            attributes: parse_attributes(caps.get(3).map_or("", |m| m.as_str())),
            tag,
            children: Vec::new(),
        };
        if &caps[4] == "/" || VOID_ELEMENTS.contains(&element.tag.as_str()) {
            push(&mut stack, &mut roots, element.into_fragment());
        } else {
            stack.push(element);
        }
    }
    push_text(&mut stack, &mut roots, &markup[last..]);

    while let Some(open) = stack.pop() {
        push(&mut stack, &mut roots, open.into_fragment());
    }
    roots
}

fn parse_attributes(source: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps.get(2).map_or("", |m| m.as_str()).to_string();
            (name, value)
        })
        .collect()
}

fn push(stack: &mut [OpenElement], roots: &mut Vec<Fragment>, fragment: Fragment) {
    match stack.last_mut() {
        Some(open) => open.children.push(fragment),
        None => roots.push(fragment),
    }
}

fn push_text(stack: &mut [OpenElement], roots: &mut Vec<Fragment>, text: &str) {
    let text = text.split_whitespace().join(" ");
    if !text.is_empty() {
        push(stack, roots, Fragment::Text(text));
    }
}
