//! Inline style declarations: parsing, presentational attributes, and the
//! keyword tables shared by the cascade and the shorthand expander.

pub mod color;
mod shorthand;

pub use color::{CssColor, is_color, parse_color, to_hex};
pub use shorthand::expand_shorthands;

use crate::dom::Element;

pub const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

pub const BORDER_WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];

/// CSS absolute-size keywords and their size in CSS pixels.
pub const FONT_SIZE_KEYWORDS: &[(&str, f64)] = &[
    ("xx-small", 9.0),
    ("x-small", 10.0),
    ("small", 13.0),
    ("medium", 16.0),
    ("large", 18.0),
    ("x-large", 24.0),
    ("xx-large", 32.0),
    ("xxx-large", 48.0),
];

/// Ascending font sizes in half points that `smaller` and `larger` step through.
pub const FONT_SIZE_STEPS: &[u32] = &[
    10, 11, 13, 14, 15, 16, 18, 20, 21, 22, 24, 28, 30, 32, 36, 44, 48, 52, 56, 72, 84, 96, 144,
];

/// Fonts recognised as a real first choice when scanning a `font` shorthand
/// family list. Anything else is assumed to be a web font the output document
/// will not have.
pub const MAJOR_FONTS: &[&str] = &[
    "arial",
    "arial black",
    "calibri",
    "cambria",
    "candara",
    "comic sans ms",
    "consolas",
    "constantia",
    "corbel",
    "courier new",
    "franklin gothic medium",
    "garamond",
    "georgia",
    "helvetica",
    "impact",
    "lucida console",
    "lucida sans unicode",
    "microsoft yahei",
    "palatino linotype",
    "segoe ui",
    "simhei",
    "simsun",
    "tahoma",
    "times new roman",
    "trebuchet ms",
    "verdana",
    "仿宋",
    "宋体",
    "微软雅黑",
    "楷体",
    "等线",
    "黑体",
];

/// Generic families mapped to concrete fonts that exist in a default Word
/// installation.
pub fn generic_family(name: &str) -> Option<&'static str> {
    match name {
        "serif" => Some("Times New Roman"),
        "sans-serif" | "system-ui" => Some("Arial"),
        "monospace" => Some("Courier New"),
        "cursive" => Some("Comic Sans MS"),
        "fantasy" => Some("Impact"),
        _ => None,
    }
}

pub fn is_major_font(name: &str) -> bool {
    MAJOR_FONTS.contains(&name.to_lowercase().as_str())
}

pub fn unquote(value: &str) -> &str {
    let v = value.trim();
    v.strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| v.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(v)
        .trim()
}

/// The family a `font-family` list should resolve to: the first entry,
/// unquoted, with generic names mapped to concrete fonts.
pub fn first_font_family(value: &str) -> Option<String> {
    let first = unquote(value.split(',').next()?);
    if first.is_empty() {
        return None;
    }
    Some(
        generic_family(&first.to_ascii_lowercase())
            .map(str::to_string)
            .unwrap_or_else(|| first.to_string()),
    )
}

/// An ordered list of longhand `(property, value)` pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Declaration {
    entries: Vec<(String, String)>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value and expand its shorthands.
    pub fn parse(style: &str) -> Self {
        let mut decl = parse_entries(style);
        expand_shorthands(&mut decl);
        decl
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut decl = Declaration::new();
        for (name, value) in pairs {
            decl.push(name, value);
        }
        expand_shorthands(&mut decl);
        decl
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.entries
            .push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    /// Later entries win over earlier ones, as in CSS.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, v)| k == name && !v.trim().is_empty())
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries of `self` whose property `other` does not declare.
    pub fn without(&self, other: &Declaration) -> Declaration {
        Declaration {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !other.contains(k))
                .cloned()
                .collect(),
        }
    }

    /// Append `other` so its entries take precedence.
    pub fn extend(&mut self, other: Declaration) {
        self.entries.extend(other.entries);
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.entries
    }
}

/// Split a style string into raw `(name, value)` entries.
///
/// Semicolons inside quotes or parentheses do not terminate an entry. A style
/// with unbalanced quotes or parentheses is rejected as a whole; an entry
/// without a colon is dropped on its own.
fn parse_entries(style: &str) -> Declaration {
    let mut decl = Declaration::new();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in style.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, ';') if depth == 0 => {
                parts.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        if depth < 0 {
            break;
        }
    }
    if quote.is_some() || depth != 0 {
        log::warn!("Ignoring malformed inline style {:?}", style);
        return decl;
    }
    parts.push(&style[start..]);

    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some((name, value)) = part.split_once(':') else {
            log::warn!("Ignoring style declaration without a value: {:?}", part);
            continue;
        };
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            log::warn!("Ignoring style declaration with invalid name: {:?}", part);
            continue;
        }
        let mut value = value.trim();
        if let Some(idx) = value.to_ascii_lowercase().rfind("!important") {
            value = value[..idx].trim_end();
        }
        decl.push(name, value);
    }
    decl
}

/// Split a property value on whitespace, keeping parenthesised groups and
/// quoted strings together (`1px solid rgb(0, 0, 0)` → three components).
pub fn split_components(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for ch in value.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '(') => {
                depth += 1;
                current.push(ch);
            }
            (None, ')') => {
                depth -= 1;
                current.push(ch);
            }
            (None, c) if c.is_whitespace() && depth <= 0 => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// The declaration an element contributes to the cascade: presentational
/// attributes first, then its `style` attribute, so inline CSS wins.
pub fn element_declaration(el: &Element) -> Declaration {
    let mut decl = Declaration::new();
    if let Some(align) = el.attr("align") {
        match el.name.as_str() {
            "img" | "table" => {
                if matches!(align.to_ascii_lowercase().as_str(), "left" | "right") {
                    decl.push("float", align);
                }
            }
            _ => decl.push("text-align", align),
        }
    }
    if let Some(valign) = el.attr("valign") {
        decl.push("vertical-align", valign);
    }
    if let Some(bgcolor) = el.attr("bgcolor") {
        decl.push("background-color", bgcolor);
    }
    if let Some(style) = el.attr("style") {
        decl.extend(Declaration::parse(style));
    }
    decl
}
