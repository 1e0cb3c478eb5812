#![allow(dead_code)]

use std::io::{Cursor, Read};

use base64::Engine;
use docxide_html::model::{BlockRef, Drawing, Paragraph, ParagraphId, Run, RunContent, Table};
use docxide_html::{Document, HtmlRenderer, RenderConfig};

pub fn render(html: &str) -> Document {
    render_with(html, RenderConfig::default())
}

pub fn render_with(html: &str, config: RenderConfig) -> Document {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::default();
    HtmlRenderer::new(config)
        .render_html(&mut doc, html)
        .expect("render failed");
    doc
}

/// Paragraphs in document order, including those inside tables.
pub fn paragraphs(doc: &Document) -> Vec<&Paragraph> {
    doc.paragraphs_in_order()
        .into_iter()
        .map(|id| doc.paragraph(id))
        .collect()
}

/// Text of every non-empty paragraph, in document order.
pub fn texts(doc: &Document) -> Vec<String> {
    paragraphs(doc)
        .iter()
        .map(|p| p.text())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn body_paragraph(doc: &Document, index: usize) -> ParagraphId {
    let ids: Vec<ParagraphId> = doc
        .body()
        .iter()
        .filter_map(|b| match b {
            BlockRef::Paragraph(id) => Some(*id),
            BlockRef::Table(_) => None,
        })
        .collect();
    ids[index]
}

pub fn first_table(doc: &Document) -> &Table {
    let id = doc
        .body()
        .iter()
        .find_map(|b| match b {
            BlockRef::Table(id) => Some(*id),
            BlockRef::Paragraph(_) => None,
        })
        .expect("no table in body");
    doc.table(id)
}

/// First run whose text contains `needle`.
pub fn run_with_text<'a>(doc: &'a Document, needle: &str) -> &'a Run {
    doc.paragraphs_in_order()
        .into_iter()
        .flat_map(|id| doc.paragraph(id).runs())
        .find(|r| r.text().contains(needle))
        .unwrap_or_else(|| panic!("no run containing {needle:?}"))
}

pub fn drawings(doc: &Document) -> Vec<&Drawing> {
    doc.paragraphs_in_order()
        .into_iter()
        .flat_map(|id| doc.paragraph(id).runs())
        .flat_map(|r| r.content.iter())
        .filter_map(|c| match c {
            RunContent::Drawing(d) => Some(d),
            _ => None,
        })
        .collect()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([0, 128, 255]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png(width, height))
    )
}

/// Read one part out of a packaged document.
pub fn read_part(docx: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(docx)).expect("not a zip archive");
    let mut content = String::new();
    zip.by_name(name)
        .unwrap_or_else(|_| panic!("missing part {name}"))
        .read_to_string(&mut content)
        .unwrap();
    content
}

pub fn part_names(docx: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(docx)).expect("not a zip archive");
    zip.file_names().map(str::to_string).collect()
}
