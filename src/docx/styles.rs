use std::fmt::Write;

use crate::dom::escape_xml_attr;
use crate::model::Document;

use super::{WML_NS, XML_DECL};

const DEFAULT_FONT: &str = "Calibri";

/// `word/styles.xml`. Rendered content carries direct formatting, so only the
/// document defaults and the "Normal" styles are declared.
pub fn styles_xml(doc: &Document) -> String {
    let mut font = String::new();
    escape_xml_attr(doc.default_font.as_deref().unwrap_or(DEFAULT_FONT), &mut font);
    let size = doc.default_font_size;

    let mut out = String::from(XML_DECL);
    let _ = write!(
        out,
        "<w:styles xmlns:w=\"{WML_NS}\">\
         <w:docDefaults>\
         <w:rPrDefault><w:rPr>\
         <w:rFonts w:ascii=\"{font}\" w:eastAsia=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>\
         <w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>\
         <w:lang w:val=\"en-US\"/>\
         </w:rPr></w:rPrDefault>\
         <w:pPrDefault><w:pPr><w:spacing w:after=\"0\" w:line=\"240\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault>\
         </w:docDefaults>\
         <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>\
         <w:style w:type=\"character\" w:default=\"1\" w:styleId=\"DefaultParagraphFont\"><w:name w:val=\"Default Paragraph Font\"/><w:uiPriority w:val=\"1\"/><w:semiHidden/></w:style>\
         <w:style w:type=\"table\" w:default=\"1\" w:styleId=\"TableNormal\"><w:name w:val=\"Normal Table\"/><w:semiHidden/>\
         <w:tblPr><w:tblInd w:w=\"0\" w:type=\"dxa\"/><w:tblCellMar>\
         <w:top w:w=\"0\" w:type=\"dxa\"/><w:left w:w=\"108\" w:type=\"dxa\"/>\
         <w:bottom w:w=\"0\" w:type=\"dxa\"/><w:right w:w=\"108\" w:type=\"dxa\"/>\
         </w:tblCellMar></w:tblPr></w:style>\
         <w:style w:type=\"numbering\" w:default=\"1\" w:styleId=\"NoList\"><w:name w:val=\"No List\"/><w:semiHidden/></w:style>\
         </w:styles>"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_document() {
        let mut doc = Document::default();
        doc.default_font_size = 24;
        doc.default_font = Some("Times New Roman".into());
        let xml = styles_xml(&doc);
        roxmltree::Document::parse(&xml).unwrap();
        assert!(xml.contains("<w:sz w:val=\"24\"/>"));
        assert!(xml.contains("w:ascii=\"Times New Roman\""));
    }
}
