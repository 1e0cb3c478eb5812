use crate::dom::Element;
use crate::error::Error;
use crate::numbering::{LevelDescription, ListStyle};
use crate::render::RenderContext;
use crate::units::{Length, emu_to_twips};

use super::{Flow, TagPolicy};

const BULLETS: [ListStyle; 3] = [ListStyle::Disc, ListStyle::Circle, ListStyle::Square];

/// `ul`/`ol`: opens one numbering level for the duration of the list.
pub struct ListPolicy;

impl TagPolicy for ListPolicy {
    fn tags(&self) -> &[&str] {
        &["ul", "ol", "menu", "dir"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let own = ctx.top_declaration().cloned().unwrap_or_default();
        let depth = ctx.numbering().depth();
        let ordered = el.name == "ol";
        let style = own
            .get("list-style-type")
            .and_then(ListStyle::from_css)
            .or_else(|| el.attr("type").and_then(ListStyle::from_type_attribute))
            .unwrap_or(if ordered {
                ListStyle::Decimal
            } else {
                BULLETS[depth % BULLETS.len()]
            });

        let available = ctx.available_width_emu(ctx.current_container())?;
        let offset = |side: &str| -> i64 {
            let emu: i64 = ["margin", "padding"]
                .iter()
                .filter_map(|prop| own.get(&format!("{prop}-{side}")))
                .filter_map(Length::parse)
                .filter_map(|l| ctx.resolve_length_emu(l, Some(available)))
                .sum();
            emu_to_twips(emu)
        };

        let mut level = LevelDescription::new(style);
        level.left = offset("left");
        level.right = offset("right");
        level.hanging = ctx.get_property_value("list-style-position", false, false) != "inside";
        if ordered {
            level.start = el
                .attr("start")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(1);
        }
        log::debug!("Opening list level {} as {:?}", depth, style);
        ctx.numbering().start_level(level);
        Ok(Flow::Descend)
    }

    fn end(&self, _el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        ctx.end_list_level()?;
        Ok(())
    }
}

/// `li`: a block whose paragraph joins the innermost open list level.
pub struct ListItemPolicy;

impl TagPolicy for ListItemPolicy {
    fn tags(&self) -> &[&str] {
        &["li"]
    }

    fn is_block(&self) -> bool {
        true
    }

    fn start(&self, _el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        if let Some(p) = ctx.current_paragraph()
            && !ctx.numbering().add(p)
        {
            log::debug!("List item outside of a list renders as a plain paragraph");
        }
        Ok(Flow::Descend)
    }
}
