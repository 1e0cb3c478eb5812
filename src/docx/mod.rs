//! Serialising a [`Document`] into a WordprocessingML package.

mod document;
mod numbering;
mod styles;

use std::io::{Cursor, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::dom::escape_xml_attr;
use crate::error::Error;
use crate::model::{Document, ImageFormat};

pub use document::document_xml;
pub use numbering::numbering_xml;
pub use styles::styles_xml;

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
pub(crate) const WPD_NS: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(crate) const MATH_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_TYPE_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const MEDIA_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::Svg,
];

#[derive(Clone, Debug, PartialEq)]
struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

/// Relationships of `word/document.xml`, allocated while the body is
/// written.
#[derive(Clone, Debug, Default)]
pub(crate) struct Relationships {
    entries: Vec<Relationship>,
    /// rId per media index.
    images: Vec<Option<String>>,
}

impl Relationships {
    fn new() -> Self {
        let mut rels = Self::default();
        rels.push(REL_TYPE_STYLES, "styles.xml".into(), false);
        rels.push(REL_TYPE_NUMBERING, "numbering.xml".into(), false);
        rels
    }

    fn push(&mut self, kind: &'static str, target: String, external: bool) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            kind,
            target,
            external,
        });
        id
    }

    pub(crate) fn hyperlink(&mut self, url: &str) -> String {
        if let Some(rel) = self
            .entries
            .iter()
            .find(|r| r.kind == REL_TYPE_HYPERLINK && r.target == url)
        {
            return rel.id.clone();
        }
        self.push(REL_TYPE_HYPERLINK, url.to_string(), true)
    }

    pub(crate) fn image(&mut self, index: usize, format: ImageFormat) -> String {
        if self.images.len() <= index {
            self.images.resize(index + 1, None);
        }
        if let Some(id) = &self.images[index] {
            return id.clone();
        }
        let id = self.push(REL_TYPE_IMAGE, media_path(index, format), false);
        self.images[index] = Some(id.clone());
        id
    }

    fn to_xml(&self) -> String {
        let mut out = String::from(XML_DECL);
        out.push_str(&format!("<Relationships xmlns=\"{PACKAGE_REL_NS}\">"));
        for rel in &self.entries {
            out.push_str(&format!("<Relationship Id=\"{}\" Type=\"{}\" Target=\"", rel.id, rel.kind));
            escape_xml_attr(&rel.target, &mut out);
            out.push('"');
            if rel.external {
                out.push_str(" TargetMode=\"External\"");
            }
            out.push_str("/>");
        }
        out.push_str("</Relationships>");
        out
    }
}

/// Path of a media part relative to `word/`.
fn media_path(index: usize, format: ImageFormat) -> String {
    format!("media/image{}.{}", index + 1, format.extension())
}

fn content_types_xml() -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    );
    for format in MEDIA_FORMATS {
        out.push_str(&format!(
            "<Default Extension=\"{}\" ContentType=\"{}\"/>",
            format.extension(),
            format.content_type()
        ));
    }
    out.push_str(
        "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
         <Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
         <Override PartName=\"/word/numbering.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml\"/>\
         </Types>",
    );
    out
}

fn package_rels_xml() -> String {
    format!(
        "{XML_DECL}<Relationships xmlns=\"{PACKAGE_REL_NS}\">\
         <Relationship Id=\"rId1\" Type=\"{REL_TYPE_DOCUMENT}\" Target=\"word/document.xml\"/>\
         </Relationships>"
    )
}

/// Build the complete `.docx` package in memory.
pub fn write_docx(doc: &Document) -> Result<Vec<u8>, Error> {
    let mut rels = Relationships::new();
    let body = document::write_document(doc, &mut rels);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("word/document.xml", body),
        ("word/_rels/document.xml.rels", rels.to_xml()),
        ("word/styles.xml", styles_xml(doc)),
        ("word/numbering.xml", numbering_xml(doc)),
    ];
    for (name, xml) in parts {
        zip.start_file(name, opt)?;
        zip.write_all(xml.as_bytes())?;
    }

    // only pictures the body still references
    for (index, media) in doc.media().iter().enumerate() {
        if rels.images.get(index).is_none_or(|id| id.is_none()) {
            continue;
        }
        zip.start_file(format!("word/{}", media_path(index, media.format)), opt)?;
        zip.write_all(&media.data)?;
    }

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    log::debug!(
        "Packaged {} relationships, {} media parts, {} bytes",
        rels.entries.len(),
        rels.images.iter().flatten().count(),
        bytes.len()
    );
    Ok(bytes)
}

pub fn save(doc: &Document, path: &Path) -> Result<(), Error> {
    let bytes = write_docx(doc)?;
    std::fs::write(path, &bytes).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", e, path.display()),
        ))
    })
}
