//! Owned HTML tree consumed by the renderer.
//!
//! The renderer only needs tag names, attributes and children, plus the
//! ability to stamp attributes onto elements (table layout records row/cell
//! indices on the cells it lays out). [`parse_fragment`] builds the tree from
//! markup with `kuchiki`; hosts with their own parser can build it directly.

use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};

/// Tags that start a new block in the absence of a dedicated tag policy.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "details",
    "dialog", "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "legend", "li", "main", "menu",
    "nav", "noscript", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot",
    "th", "thead", "tr", "ul",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attributes
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(pos).1)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_block(&self) -> bool {
        BLOCK_TAGS.contains(&self.name.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize the subtree as well-formed XML. Used to hand SVG and MathML
    /// islands to collaborators that expect XML rather than HTML.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_xml(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

fn write_xml(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    let mut has_xmlns = false;
    for (k, v) in el.attributes() {
        if k == "xmlns" {
            has_xmlns = true;
        }
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        escape_xml_attr(v, out);
        out.push('"');
    }
    if !has_xmlns {
        match el.name.as_str() {
            "svg" => out.push_str(" xmlns=\"http://www.w3.org/2000/svg\""),
            "math" => out.push_str(" xmlns=\"http://www.w3.org/1998/Math/MathML\""),
            _ => {}
        }
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            Node::Element(e) => write_xml(e, out),
            Node::Text(t) => escape_xml_text(t, out),
        }
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

/// Whether XML 1.0 can carry `c` at all. C0 controls other than tab and line
/// ends are not allowed, not even as character references.
pub(crate) fn is_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

pub(crate) fn escape_xml_attr(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            ch if !is_xml_char(ch) => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_xml_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            ch if !is_xml_char(ch) => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Parse an HTML fragment (or a whole document) and return its `body`.
pub fn parse_fragment(html: &str) -> Element {
    let document = kuchiki::parse_html().one(html);
    match document.select_first("body") {
        Ok(body) => convert_element(body.as_node()).unwrap_or_else(|| Element::new("body")),
        Err(()) => {
            let mut body = Element::new("body");
            for child in document.children() {
                push_converted(&child, &mut body.children);
            }
            body
        }
    }
}

fn convert_element(node: &NodeRef) -> Option<Element> {
    let NodeData::Element(data) = node.data() else {
        return None;
    };
    let mut el = Element::new(data.name.local.as_ref());
    {
        let attrs = data.attributes.borrow();
        for (name, attr) in attrs.map.iter() {
            el.set_attr(name.local.as_ref(), &attr.value);
        }
    }
    for child in node.children() {
        push_converted(&child, &mut el.children);
    }
    Some(el)
}

fn push_converted(node: &NodeRef, out: &mut Vec<Node>) {
    match node.data() {
        NodeData::Element(_) => {
            if let Some(el) = convert_element(node) {
                out.push(Node::Element(el));
            }
        }
        NodeData::Text(text) => {
            let text = text.borrow();
            // adjacent text nodes are merged so whitespace handling sees one run
            if let Some(Node::Text(prev)) = out.last_mut() {
                prev.push_str(&text);
            } else {
                out.push(Node::Text(text.to_string()));
            }
        }
        _ => {}
    }
}
