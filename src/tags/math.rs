use crate::dom::Element;
use crate::error::Error;
use crate::render::RenderContext;
use crate::resources::MathKind;

use super::{Flow, TagPolicy};

/// Class MathJax-style markup uses for inline TeX.
const TEX_CLASS: &str = "math-tex";

const TEX_DELIMITERS: [(&str, &str); 4] = [("\\(", "\\)"), ("\\[", "\\]"), ("$$", "$$"), ("$", "$")];

/// Convert a formula through the host's converter. Without one, or when
/// conversion fails, the formula is left out.
fn render_formula(ctx: &mut RenderContext, source: &str, kind: MathKind) -> Result<(), Error> {
    let Some(converter) = ctx.math() else {
        log::warn!("No math converter configured, skipping {:?} formula", kind);
        return Ok(());
    };
    match converter.convert(source, kind) {
        Ok(omml) => ctx.render_math(omml),
        Err(err) if !err.is_fatal() => {
            log::warn!("Skipping formula: {}", err);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn strip_tex_delimiters(source: &str) -> &str {
    let source = source.trim();
    for (open, close) in TEX_DELIMITERS {
        if let Some(inner) = source
            .strip_prefix(open)
            .and_then(|s| s.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    source
}

/// `<math>`: MathML islands.
pub struct MathPolicy;

impl TagPolicy for MathPolicy {
    fn tags(&self) -> &[&str] {
        &["math"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        render_formula(ctx, &el.to_xml(), MathKind::MathMl)?;
        Ok(Flow::Skip)
    }
}

/// `<span>`: ordinary inline content, except for TeX formula spans.
pub struct SpanPolicy;

impl TagPolicy for SpanPolicy {
    fn tags(&self) -> &[&str] {
        &["span"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        if !el.has_class(TEX_CLASS) {
            return Ok(Flow::Descend);
        }
        let text = el.text_content();
        let source = strip_tex_delimiters(&text);
        if !source.is_empty() {
            render_formula(ctx, source, MathKind::Latex)?;
        }
        Ok(Flow::Skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tex_delimiters_are_stripped() {
        assert_eq!(strip_tex_delimiters(" \\(x^2\\) "), "x^2");
        assert_eq!(strip_tex_delimiters("\\[ a \\]"), "a");
        assert_eq!(strip_tex_delimiters("$$y$$"), "y");
        assert_eq!(strip_tex_delimiters("$z$"), "z");
        assert_eq!(strip_tex_delimiters("plain"), "plain");
    }
}
