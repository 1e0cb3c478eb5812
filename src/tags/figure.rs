use crate::css::Declaration;
use crate::dom::Element;
use crate::error::Error;
use crate::model::{Alignment, BlockRef};
use crate::render::RenderContext;

use super::{Flow, TagPolicy, push_synthetic_style};

/// `figure`/`figcaption`. A figure is laid out as a standalone paragraph,
/// aligned after its float and centred otherwise.
pub struct FigurePolicy;

fn figure_alignment(decl: &Declaration) -> Alignment {
    match decl.get("float").map(|f| f.trim().to_ascii_lowercase()).as_deref() {
        Some("left") => Alignment::Left,
        Some("right") => Alignment::Right,
        _ => Alignment::Center,
    }
}

impl TagPolicy for FigurePolicy {
    fn tags(&self) -> &[&str] {
        &["figure", "figcaption"]
    }

    fn is_block(&self) -> bool {
        true
    }

    fn default_style(&self, el: &Element) -> Option<Declaration> {
        (el.name == "figcaption").then(|| Declaration::from_pairs(&[("text-align", "center")]))
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        if el.name != "figure" {
            return Ok(Flow::Descend);
        }
        let own = ctx.top_declaration().cloned().unwrap_or_default();
        let alignment = figure_alignment(&own);
        let keyword = match alignment {
            Alignment::Left => "left",
            Alignment::Right => "right",
            _ => "center",
        };
        push_synthetic_style(ctx, &Declaration::from_pairs(&[("text-align", keyword)]));
        if let Some(p) = ctx.current_paragraph() {
            ctx.document_mut().paragraph_mut(p).props.alignment = Some(alignment);
            // the figure's own paragraph survives even if nothing lands in it
            // before the first nested block
            ctx.push_dedupe(p);
        }
        Ok(Flow::Descend)
    }

    fn end(&self, el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        if el.name != "figure" {
            return Ok(());
        }
        ctx.pop_dedupe();
        if let Some(BlockRef::Paragraph(p)) = ctx.current_block()
            && ctx.document().paragraph(p).is_empty()
        {
            ctx.discard_if_empty(p)?;
        }
        ctx.pop_inline_style();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_decides_alignment() {
        assert_eq!(figure_alignment(&Declaration::parse("float: Right")), Alignment::Right);
        assert_eq!(figure_alignment(&Declaration::parse("float: left")), Alignment::Left);
        assert_eq!(figure_alignment(&Declaration::new()), Alignment::Center);
    }
}
