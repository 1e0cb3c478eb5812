use crate::dom::{Element, Node};
use crate::error::Error;
use crate::model::{FieldCharType, Run, RunContent, RunProperties};
use crate::render::RenderContext;

use super::{Flow, TagPolicy};

/// Word has no ruby element; annotations become an `EQ` field that overlays
/// the ruby text above its base.
pub struct RubyPolicy;

const FALLBACK_RUBY_FONT: &str = "MS Mincho";

/// Base text paired with its annotation, in source order.
fn ruby_pairs(el: &Element) -> (Vec<(String, String)>, String) {
    let mut pairs = Vec::new();
    let mut base = String::new();
    for child in &el.children {
        match child {
            Node::Text(text) => base.push_str(text),
            Node::Element(child) => match child.name.as_str() {
                "rt" => {
                    let base = std::mem::take(&mut base);
                    pairs.push((base.trim().to_string(), child.text_content().trim().to_string()));
                }
                "rp" => {}
                _ => base.push_str(&child.text_content()),
            },
        }
    }
    (pairs, base)
}

fn escape_field(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | ',' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `EQ \o\ad` instruction placing `ruby` above `base`. `size` is the base
/// font size in half points; the annotation is set at half of it.
fn ruby_instruction(base: &str, ruby: &str, font: &str, size: u32) -> String {
    let ruby_size = (size / 2).max(1);
    let raise = ruby_size.saturating_sub(1);
    format!(
        " EQ \\* jc2 \\* \"Font:{font}\" \\* hps{ruby_size} \\o\\ad(\\s\\up {raise}({}),{}) ",
        escape_field(ruby),
        escape_field(base),
    )
}

fn field_runs(props: &RunProperties, instruction: String) -> Vec<Run> {
    [
        RunContent::FieldChar(FieldCharType::Begin),
        RunContent::InstrText(instruction),
        RunContent::FieldChar(FieldCharType::End),
    ]
    .into_iter()
    .map(|content| Run {
        props: props.clone(),
        content: vec![content],
    })
    .collect()
}

impl TagPolicy for RubyPolicy {
    fn tags(&self) -> &[&str] {
        &["ruby"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let (pairs, rest) = ruby_pairs(el);
        let props = ctx.run_properties();
        let size = props.size.unwrap_or_else(|| ctx.font_size());
        let font = props
            .font
            .clone()
            .or_else(|| ctx.document().default_font.clone())
            .unwrap_or_else(|| FALLBACK_RUBY_FONT.to_string());

        for (base, ruby) in pairs {
            if ruby.is_empty() {
                ctx.render_text(&base)?;
                continue;
            }
            log::debug!("Ruby {:?} over {:?}", ruby, base);
            ctx.render_runs(field_runs(&props, ruby_instruction(&base, &ruby, &font, size)))?;
        }
        if !rest.is_empty() {
            ctx.render_text(&rest)?;
        }
        Ok(Flow::Skip)
    }
}
