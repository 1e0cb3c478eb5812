mod config;
pub mod css;
pub mod docx;
pub mod dom;
mod error;
pub mod model;
pub mod numbering;
pub mod render;
pub mod resources;
pub mod tags;
pub mod units;

pub use config::RenderConfig;
pub use docx::{save, write_docx};
pub use error::Error;
pub use model::{ContainerId, Document, PageGeometry};
pub use render::{HtmlRenderer, RenderContext, render};
pub use resources::{DefaultImageLoader, ImageLoader, LoadedImage, MathConverter, MathKind};
pub use tags::{Flow, TagPolicy, TagRegistry};

use std::path::Path;
use std::time::Instant;

/// Render an HTML fragment into a fresh document and package it as `.docx`
/// bytes.
pub fn render_html_to_docx(html: &str, config: RenderConfig) -> Result<Vec<u8>, Error> {
    let renderer = HtmlRenderer::new(config);
    let mut doc = Document::default();
    renderer.render_html(&mut doc, html)?;
    write_docx(&doc)
}

pub fn convert_html_file(input: &Path, output: &Path, config: RenderConfig) -> Result<(), Error> {
    let base_dir = input.parent().map(Path::to_path_buf).unwrap_or_default();
    convert_html_file_with(input, output, config, DefaultImageLoader::with_base_dir(base_dir))
}

pub fn convert_html_file_with(
    input: &Path,
    output: &Path,
    config: RenderConfig,
    images: impl ImageLoader + 'static,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let html = std::fs::read_to_string(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    let t_read = t0.elapsed();

    let renderer = HtmlRenderer::new(config).with_image_loader(images);
    let mut doc = Document::default();
    renderer.render_html(&mut doc, &html)?;
    let t_render = t0.elapsed();

    let bytes = write_docx(&doc)?;
    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, render={:.1}ms, package={:.1}ms, total={:.1}ms (output {} bytes)",
        t_read.as_secs_f64() * 1000.0,
        (t_render - t_read).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
