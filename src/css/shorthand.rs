use crate::units::Length;

use super::{
    BORDER_STYLES, BORDER_WIDTH_KEYWORDS, Declaration, FONT_SIZE_KEYWORDS, is_color,
    is_major_font, split_components, unquote,
};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

const DECORATION_STYLES: &[&str] = &["solid", "double", "dotted", "dashed", "wavy"];

/// Replace every shorthand entry of `decl` with its longhands, in place.
///
/// Running this on a declaration that only holds longhands changes nothing,
/// since no entry matches a shorthand name.
pub fn expand_shorthands(decl: &mut Declaration) {
    let entries = std::mem::take(decl.entries_mut());
    let mut out = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        match expand(&name, &value) {
            Some(longhands) => out.extend(longhands),
            None => out.push((name, value)),
        }
    }
    *decl.entries_mut() = out;
}

fn expand(name: &str, value: &str) -> Option<Vec<(String, String)>> {
    let expanded = match name {
        "border" => expand_border(value, &SIDES),
        "border-top" => expand_border(value, &["top"]),
        "border-right" => expand_border(value, &["right"]),
        "border-bottom" => expand_border(value, &["bottom"]),
        "border-left" => expand_border(value, &["left"]),
        "border-style" => expand_box(value, |side| format!("border-{side}-style")),
        "border-width" => expand_box(value, |side| format!("border-{side}-width")),
        "border-color" => expand_box(value, |side| format!("border-{side}-color")),
        "margin" => expand_box(value, |side| format!("margin-{side}")),
        "padding" => expand_box(value, |side| format!("padding-{side}")),
        "font" => expand_font(value),
        "list-style" => expand_list_style(value),
        "text-decoration" => expand_text_decoration(value),
        "background" => expand_background(value),
        _ => return None,
    };
    Some(expanded)
}

pub(crate) fn is_border_width(value: &str) -> bool {
    let v = value.to_ascii_lowercase();
    BORDER_WIDTH_KEYWORDS.contains(&v.as_str()) || Length::parse(&v).is_some()
}

pub(crate) fn is_border_style(value: &str) -> bool {
    BORDER_STYLES.contains(&value.to_ascii_lowercase().as_str())
}

fn expand_border(value: &str, sides: &[&str]) -> Vec<(String, String)> {
    let mut style = None;
    let mut width = None;
    let mut color = None;
    for component in split_components(value) {
        if is_border_style(&component) {
            style = Some(component.to_ascii_lowercase());
        } else if is_border_width(&component) {
            width = Some(component);
        } else {
            color = Some(component);
        }
    }
    let mut out = Vec::new();
    for side in sides {
        if let Some(ref w) = width {
            out.push((format!("border-{side}-width"), w.clone()));
        }
        if let Some(ref s) = style {
            out.push((format!("border-{side}-style"), s.clone()));
        }
        if let Some(ref c) = color {
            out.push((format!("border-{side}-color"), c.clone()));
        }
    }
    out
}

/// CSS 1-to-4 value box expansion, in top/right/bottom/left order.
fn expand_box(value: &str, name: impl Fn(&str) -> String) -> Vec<(String, String)> {
    let v = split_components(value);
    let [top, right, bottom, left] = match v.as_slice() {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left, ..] => [top, right, bottom, left],
        [] => return Vec::new(),
    };
    SIDES
        .iter()
        .zip([top, right, bottom, left])
        .map(|(side, v)| (name(side), v.clone()))
        .collect()
}

fn is_font_size(value: &str) -> bool {
    let v = value.to_ascii_lowercase();
    FONT_SIZE_KEYWORDS.iter().any(|(k, _)| *k == v)
        || v == "smaller"
        || v == "larger"
        || Length::parse(&v).is_some()
}

fn is_font_weight(value: &str) -> bool {
    matches!(value, "bold" | "bolder" | "lighter")
        || value
            .parse::<u32>()
            .is_ok_and(|w| (1..=1000).contains(&w))
}

fn expand_font(value: &str) -> Vec<(String, String)> {
    let tokens = split_components(value);
    let mut out = Vec::new();
    let mut size: Option<String> = None;
    let mut line_height: Option<String> = None;
    let mut i = 0;
    while i < tokens.len() && size.is_none() {
        let token = tokens[i].as_str();
        let lower = token.to_ascii_lowercase();
        i += 1;
        if let Some((before, after)) = token.split_once('/') {
            if !before.is_empty() {
                size = Some(before.to_string());
            }
            if !after.is_empty() {
                line_height = Some(after.to_string());
            } else if i < tokens.len() {
                line_height = Some(tokens[i].clone());
                i += 1;
            }
            continue;
        }
        match lower.as_str() {
            "normal" => {}
            "italic" | "oblique" => out.push(("font-style".to_string(), lower.clone())),
            "small-caps" => out.push(("font-variant".to_string(), lower.clone())),
            w if is_font_weight(w) => out.push(("font-weight".to_string(), lower.clone())),
            s if is_font_size(s) => {
                size = Some(token.to_string());
                // `12px /1.5` and `12px / 1.5`
                if let Some(next) = tokens.get(i)
                    && let Some(rest) = next.strip_prefix('/')
                {
                    i += 1;
                    if !rest.is_empty() {
                        line_height = Some(rest.to_string());
                    } else if let Some(lh) = tokens.get(i) {
                        line_height = Some(lh.clone());
                        i += 1;
                    }
                }
            }
            _ => {
                // no size before the family list; the rest is the family
                i -= 1;
                break;
            }
        }
    }
    if let Some(size) = size {
        out.push(("font-size".to_string(), size));
    }
    if let Some(lh) = line_height {
        out.push(("line-height".to_string(), lh));
    }
    let family = tokens[i.min(tokens.len())..].join(" ");
    if let Some(chosen) = choose_font_family(&family) {
        out.push(("font-family".to_string(), chosen));
    }
    out
}

/// First family of the list that is a known major font, falling back to the
/// first family when none is recognised.
fn choose_font_family(list: &str) -> Option<String> {
    let families: Vec<&str> = list
        .split(',')
        .map(unquote)
        .filter(|f| !f.is_empty())
        .collect();
    let first = families.first()?;
    let chosen = families
        .iter()
        .find(|f| is_major_font(f))
        .unwrap_or(first);
    Some(chosen.to_string())
}

fn expand_list_style(value: &str) -> Vec<(String, String)> {
    split_components(value)
        .into_iter()
        .next()
        .map(|first| vec![("list-style-type".to_string(), first.to_ascii_lowercase())])
        .unwrap_or_default()
}

fn expand_text_decoration(value: &str) -> Vec<(String, String)> {
    let mut lines = Vec::new();
    let mut style = None;
    let mut color = None;
    for component in split_components(value) {
        let lower = component.to_ascii_lowercase();
        match lower.as_str() {
            "none" => return vec![("text-decoration-line".to_string(), "none".to_string())],
            "underline" | "line-through" => lines.push(lower.clone()),
            "overline" | "blink" => {}
            s if DECORATION_STYLES.contains(&s) => style = Some(lower.clone()),
            _ if is_color(&component) => color = Some(component),
            _ => log::debug!("Unsupported text-decoration component {:?}", component),
        }
    }
    let mut out = Vec::new();
    if !lines.is_empty() {
        out.push(("text-decoration-line".to_string(), lines.join(" ")));
    }
    if let Some(style) = style {
        out.push(("text-decoration-style".to_string(), style));
    }
    if let Some(color) = color {
        out.push(("text-decoration-color".to_string(), color));
    }
    out
}

fn expand_background(value: &str) -> Vec<(String, String)> {
    split_components(value)
        .into_iter()
        .rev()
        .find(|c| is_color(c))
        .map(|c| vec![("background-color".to_string(), c)])
        .unwrap_or_default()
}
