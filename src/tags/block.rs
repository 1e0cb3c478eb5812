use crate::css::Declaration;
use crate::dom::Element;
use crate::error::Error;
use crate::render::RenderContext;

use super::{Flow, TagPolicy};

/// Generic block containers. Each opens its own paragraph; a few carry the
/// browser's default styling.
pub struct BlockPolicy;

impl TagPolicy for BlockPolicy {
    fn tags(&self) -> &[&str] {
        &[
            "p", "div", "section", "article", "header", "footer", "nav", "aside", "main",
            "address", "blockquote", "dd", "dl", "dt", "center", "caption", "pre", "hr",
            "details", "summary", "hgroup", "fieldset", "legend", "form", "dialog",
        ]
    }

    fn is_block(&self) -> bool {
        true
    }

    fn default_style(&self, el: &Element) -> Option<Declaration> {
        let decl = match el.name.as_str() {
            "blockquote" | "dd" => Declaration::from_pairs(&[("margin-left", "40px")]),
            "center" | "caption" => Declaration::from_pairs(&[("text-align", "center")]),
            "pre" => Declaration::from_pairs(&[
                ("white-space", "pre"),
                ("font-family", "Courier New"),
            ]),
            "hr" => Declaration::from_pairs(&[("border-bottom", "1px solid #808080")]),
            "address" => Declaration::from_pairs(&[("font-style", "italic")]),
            "dt" | "summary" | "legend" => Declaration::from_pairs(&[("font-weight", "bold")]),
            _ => return None,
        };
        Some(decl)
    }

    fn start(&self, el: &mut Element, _ctx: &mut RenderContext) -> Result<Flow, Error> {
        if el.name == "hr" {
            return Ok(Flow::Skip);
        }
        Ok(Flow::Descend)
    }
}

pub struct BreakPolicy;

impl TagPolicy for BreakPolicy {
    fn tags(&self) -> &[&str] {
        &["br"]
    }

    fn start(&self, _el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        ctx.render_break()?;
        Ok(Flow::Skip)
    }
}

/// Elements that never produce output.
pub struct OmitPolicy;

impl TagPolicy for OmitPolicy {
    fn tags(&self) -> &[&str] {
        &[
            "head", "script", "noscript", "frame", "frameset", "iframe", "noframes", "colgroup",
            "col", "template", "style", "title", "meta", "link", "base", "object", "embed",
            "wbr", "button", "input", "select", "textarea",
        ]
    }

    fn start(&self, el: &mut Element, _ctx: &mut RenderContext) -> Result<Flow, Error> {
        log::debug!("Omitting <{}>", el.name);
        Ok(Flow::Skip)
    }
}

/// Structural wrappers that add nothing themselves.
pub struct PassThroughPolicy;

impl TagPolicy for PassThroughPolicy {
    fn tags(&self) -> &[&str] {
        &["html", "body", "thead", "tbody", "tfoot", "tr"]
    }

    fn start(&self, _el: &mut Element, _ctx: &mut RenderContext) -> Result<Flow, Error> {
        Ok(Flow::Descend)
    }
}
