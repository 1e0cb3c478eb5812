use crate::css::{Declaration, to_hex};
use crate::dom::Element;
use crate::error::Error;
use crate::model::HyperlinkTarget;
use crate::render::RenderContext;

use super::{Flow, TagPolicy, push_synthetic_style};

/// `<a href>`: wraps the runs it produces in a hyperlink. Anchors without an
/// `href` (or with a bare `#`) render as plain text.
pub struct LinkPolicy;

fn link_target(href: &str) -> Option<HyperlinkTarget> {
    let href = href.trim();
    match href.strip_prefix('#') {
        Some("") => None,
        Some(anchor) => Some(HyperlinkTarget::Anchor(anchor.to_string())),
        None if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") => None,
        None => Some(HyperlinkTarget::External(href.to_string())),
    }
}

impl TagPolicy for LinkPolicy {
    fn tags(&self) -> &[&str] {
        &["a"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let Some(target) = el.attr("href").and_then(link_target) else {
            // keep push/pop balanced for `end`
            ctx.push_inline_style(Declaration::new(), false);
            return Ok(Flow::Descend);
        };
        let color = format!("#{}", to_hex(ctx.config().hyperlink_color));
        push_synthetic_style(
            ctx,
            &Declaration::from_pairs(&[
                ("color", color.as_str()),
                ("text-decoration-line", "underline"),
            ]),
        );
        ctx.push_hyperlink(target);
        Ok(Flow::Descend)
    }

    fn end(&self, el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        if el.attr("href").and_then(link_target).is_some() {
            ctx.pop_hyperlink();
        }
        ctx.pop_inline_style();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets() {
        assert_eq!(
            link_target("https://example.com/a?b"),
            Some(HyperlinkTarget::External("https://example.com/a?b".into()))
        );
        assert_eq!(link_target(" #intro "), Some(HyperlinkTarget::Anchor("intro".into())));
        assert_eq!(link_target("#"), None);
        assert_eq!(link_target(""), None);
        assert_eq!(link_target("javascript:void(0)"), None);
    }
}
