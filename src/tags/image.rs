use crate::dom::Element;
use crate::error::Error;
use crate::render::RenderContext;
use crate::resources::LoadedImage;
use crate::units::{EMU_PER_PX, Length};

use super::{Flow, TagPolicy};

pub struct ImagePolicy;

impl TagPolicy for ImagePolicy {
    fn tags(&self) -> &[&str] {
        &["img"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let Some(src) = el.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
            log::warn!("Skipping <img> without src");
            return Ok(Flow::Skip);
        };
        let src = match src.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => src.to_string(),
        };
        let loaded = match ctx.images().load(&src) {
            Ok(loaded) => loaded,
            Err(err) => {
                log::warn!("Skipping image {}: {}", display_source(&src), err);
                return Ok(Flow::Skip);
            }
        };
        let name = picture_name(el, &src, &loaded);
        place_image(el, ctx, loaded, &name)?;
        Ok(Flow::Skip)
    }
}

/// Inline `<svg>` islands, embedded as SVG pictures.
pub struct SvgPolicy;

impl TagPolicy for SvgPolicy {
    fn tags(&self) -> &[&str] {
        &["svg"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let loaded = match ctx.images().decode(el.to_xml().into_bytes()) {
            Ok(loaded) => loaded,
            Err(err) => {
                log::warn!("Skipping inline svg: {}", err);
                return Ok(Flow::Skip);
            }
        };
        place_image(el, ctx, loaded, "svg")?;
        Ok(Flow::Skip)
    }
}

fn display_source(src: &str) -> &str {
    if src.starts_with("data:") {
        src.split(',').next().unwrap_or("data:")
    } else {
        src
    }
}

fn picture_name(el: &Element, src: &str, loaded: &LoadedImage) -> String {
    if let Some(alt) = el.attr("alt").map(str::trim).filter(|a| !a.is_empty()) {
        return alt.to_string();
    }
    if !src.starts_with("data:") {
        let path = src.split(['?', '#']).next().unwrap_or(src);
        if let Some(file) = path.rsplit('/').next().filter(|f| !f.is_empty()) {
            return file.to_string();
        }
    }
    format!("image.{}", loaded.format.extension())
}

/// Size and emit a picture. Failures to embed are logged and swallowed.
fn place_image(
    el: &Element,
    ctx: &mut RenderContext,
    loaded: LoadedImage,
    name: &str,
) -> Result<(), Error> {
    let decl = ctx.top_declaration().cloned().unwrap_or_default();
    let declared = |name: &str| {
        decl.get(name)
            .and_then(Length::parse)
            .or_else(|| el.attr(name).and_then(Length::parse_attribute))
    };
    let width = declared("width");
    let height = declared("height");
    let max_width = decl.get("max-width").and_then(Length::parse);
    let max_height = decl.get("max-height").and_then(Length::parse);
    let container = ctx.available_width_emu(ctx.current_container())?;

    let natural = (
        loaded.width_px.max(1) as i64 * EMU_PER_PX,
        loaded.height_px.max(1) as i64 * EMU_PER_PX,
    );
    let (w, h) = image_extent(
        ctx,
        natural,
        (width, height),
        (max_width, max_height),
        container,
    );
    log::debug!("Image {name}: {}x{} EMU", w, h);

    match ctx.render_picture(loaded.data, loaded.format, name, w, h) {
        Ok(_) => Ok(()),
        Err(err) if !err.is_fatal() => {
            log::warn!("Skipping image {}: {}", name, err);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Final picture extent in EMU.
///
/// Both dimensions declared: used as given. One declared: the other follows
/// the natural aspect ratio, and if the derived width overflows the container
/// both are scaled back down. Neither: the natural size, fitted to the
/// container.
pub(crate) fn image_extent(
    ctx: &RenderContext,
    natural: (i64, i64),
    declared: (Option<Length>, Option<Length>),
    max: (Option<Length>, Option<Length>),
    container: i64,
) -> (i64, i64) {
    let (nat_w, nat_h) = (natural.0.max(1), natural.1.max(1));
    let scale = |value: i64, from: i64, to: i64| -> i64 {
        ((value as f64) * (to as f64) / (from as f64)).round().max(1.0) as i64
    };
    let width_limit = ctx
        .compute_length_in_emu(None, max.0, i64::MAX / 4, Some(container));

    match declared {
        (Some(w), Some(h)) => (
            ctx.compute_length_in_emu(Some(w), max.0, nat_w, Some(container)),
            ctx.compute_length_in_emu(Some(h), max.1, nat_h, None),
        ),
        (Some(w), None) => {
            let w = ctx.compute_length_in_emu(Some(w), max.0, nat_w, Some(container));
            (w, scale(nat_h, nat_w, w))
        }
        (None, Some(h)) => {
            let h = ctx.compute_length_in_emu(Some(h), max.1, nat_h, None);
            let w = scale(nat_w, nat_h, h);
            if w > width_limit {
                (width_limit, scale(nat_h, nat_w, width_limit))
            } else {
                (w, h)
            }
        }
        (None, None) => {
            let w = nat_w.min(width_limit);
            (w, scale(nat_h, nat_w, w))
        }
    }
}
