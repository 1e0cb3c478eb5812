use crate::css::Declaration;
use crate::dom::Element;
use crate::error::Error;
use crate::render::RenderContext;

use super::{Flow, TagPolicy, push_synthetic_style};

/// Tags whose only effect is styling the text inside them.
pub struct InlineStylePolicy;

/// `<font size>` values 1 to 7.
const FONT_SIZES: [&str; 7] = [
    "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
];

fn font_size_attribute(value: &str) -> Option<&'static str> {
    let value = value.trim();
    let size: i32 = match value.strip_prefix('+') {
        Some(rel) => 3 + rel.parse::<i32>().ok()?,
        None if value.starts_with('-') => 3 + value.parse::<i32>().ok()?,
        None => value.parse().ok()?,
    };
    Some(FONT_SIZES[(size.clamp(1, 7) - 1) as usize])
}

fn inline_style(el: &Element) -> Declaration {
    match el.name.as_str() {
        "b" | "strong" => Declaration::from_pairs(&[("font-weight", "bold")]),
        "i" | "em" | "cite" | "var" | "dfn" => Declaration::from_pairs(&[("font-style", "italic")]),
        "u" | "ins" => Declaration::from_pairs(&[("text-decoration-line", "underline")]),
        "s" | "strike" | "del" => Declaration::from_pairs(&[("text-decoration-line", "line-through")]),
        "sub" => Declaration::from_pairs(&[("vertical-align", "sub")]),
        "sup" => Declaration::from_pairs(&[("vertical-align", "super")]),
        "mark" => Declaration::from_pairs(&[("background-color", "yellow")]),
        "small" => Declaration::from_pairs(&[("font-size", "smaller")]),
        "big" => Declaration::from_pairs(&[("font-size", "larger")]),
        "code" | "kbd" | "samp" | "tt" => {
            Declaration::from_pairs(&[("font-family", "Courier New")])
        }
        "font" => {
            let mut decl = Declaration::new();
            if let Some(face) = el.attr("face") {
                decl.push("font-family", face);
            }
            if let Some(color) = el.attr("color") {
                decl.push("color", color);
            }
            if let Some(size) = el.attr("size").and_then(font_size_attribute) {
                decl.push("font-size", size);
            }
            decl
        }
        _ => Declaration::new(),
    }
}

impl TagPolicy for InlineStylePolicy {
    fn tags(&self) -> &[&str] {
        &[
            "b", "strong", "i", "em", "cite", "var", "dfn", "u", "ins", "s", "strike", "del",
            "sub", "sup", "mark", "small", "big", "code", "kbd", "samp", "tt", "font", "q",
        ]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        push_synthetic_style(ctx, &inline_style(el));
        if el.name == "q" {
            ctx.render_text("\u{201C}")?;
        }
        Ok(Flow::Descend)
    }

    fn end(&self, el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        if el.name == "q" {
            ctx.render_text("\u{201D}")?;
        }
        ctx.pop_inline_style();
        Ok(())
    }
}

/// `h1`–`h6`: a block with heading size, bold text and an outline level.
pub struct HeadingPolicy;

fn heading_level(name: &str) -> Option<u8> {
    let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

impl TagPolicy for HeadingPolicy {
    fn tags(&self) -> &[&str] {
        &["h1", "h2", "h3", "h4", "h5", "h6"]
    }

    fn is_block(&self) -> bool {
        true
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let level = heading_level(&el.name).unwrap_or(1);
        let size = match level {
            1 => "24pt",
            2 => "18pt",
            3 => "14pt",
            4 => "12pt",
            5 => "10pt",
            _ => "8pt",
        };
        push_synthetic_style(
            ctx,
            &Declaration::from_pairs(&[("font-size", size), ("font-weight", "bold")]),
        );
        if let Some(p) = ctx.current_paragraph() {
            let props = &mut ctx.document_mut().paragraph_mut(p).props;
            props.outline_level = Some(level - 1);
            props.keep_next = true;
        }
        Ok(Flow::Descend)
    }

    fn end(&self, _el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        ctx.pop_inline_style();
        Ok(())
    }
}
