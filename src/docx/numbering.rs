use std::fmt::Write;

use crate::dom::escape_xml_attr;
use crate::model::{Document, LevelSuffix, NumberingLevel};

use super::{WML_NS, XML_DECL};

/// `word/numbering.xml`: one abstract definition per numbering definition and
/// one `w:num` per list instance. Instances restart their levels through
/// start overrides, otherwise Word continues counting across lists that share
/// a definition.
pub fn numbering_xml(doc: &Document) -> String {
    let mut out = String::from(XML_DECL);
    let _ = write!(out, "<w:numbering xmlns:w=\"{WML_NS}\">");
    // every abstractNum must precede the first num
    for def in doc.numbering() {
        let _ = write!(
            out,
            "<w:abstractNum w:abstractNumId=\"{}\">\
             <w:multiLevelType w:val=\"hybridMultilevel\"/>",
            def.abstract_id
        );
        for (ilvl, level) in def.levels.iter().enumerate() {
            write_level(&mut out, ilvl, level);
        }
        out.push_str("</w:abstractNum>");
    }
    for instance in doc.numbering_instances() {
        let _ = write!(
            out,
            "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"{}\"/>",
            instance.num_id, instance.abstract_id
        );
        for (ilvl, start) in instance.start_overrides.iter().enumerate() {
            let _ = write!(
                out,
                "<w:lvlOverride w:ilvl=\"{ilvl}\"><w:startOverride w:val=\"{start}\"/></w:lvlOverride>"
            );
        }
        out.push_str("</w:num>");
    }
    out.push_str("</w:numbering>");
    out
}

fn write_level(out: &mut String, ilvl: usize, level: &NumberingLevel) {
    let _ = write!(
        out,
        "<w:lvl w:ilvl=\"{ilvl}\"><w:start w:val=\"{}\"/><w:numFmt w:val=\"{}\"/>",
        level.start,
        level.format.wml_name()
    );
    if level.suffix != LevelSuffix::Tab {
        let _ = write!(out, "<w:suff w:val=\"{}\"/>", level.suffix.wml_name());
    }
    out.push_str("<w:lvlText w:val=\"");
    escape_xml_attr(&level.text, out);
    out.push_str("\"/><w:lvlJc w:val=\"left\"/><w:pPr><w:ind");
    let _ = write!(out, " w:left=\"{}\"", level.indent_left);
    if level.indent_right != 0 {
        let _ = write!(out, " w:right=\"{}\"", level.indent_right);
    }
    if level.hanging > 0 {
        let _ = write!(out, " w:hanging=\"{}\"", level.hanging);
    }
    out.push_str("/></w:pPr>");
    if let Some(font) = &level.font {
        let mut name = String::new();
        escape_xml_attr(font, &mut name);
        let _ = write!(
            out,
            "<w:rPr><w:rFonts w:ascii=\"{name}\" w:hAnsi=\"{name}\" w:hint=\"default\"/></w:rPr>"
        );
    }
    out.push_str("</w:lvl>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NumberFormat;

    fn level(format: NumberFormat, text: &str) -> NumberingLevel {
        NumberingLevel {
            format,
            text: text.into(),
            start: 1,
            indent_left: 360,
            indent_right: 0,
            hanging: 360,
            suffix: LevelSuffix::Tab,
            font: None,
        }
    }

    #[test]
    fn abstract_definitions_precede_instances() {
        let mut doc = Document::default();
        let a = doc.add_numbering("a".into(), vec![level(NumberFormat::Decimal, "%1.")]);
        let b = doc.add_numbering("b".into(), vec![level(NumberFormat::Bullet, "\u{2022}")]);
        let first = doc.add_numbering_instance(a).unwrap();
        let second = doc.add_numbering_instance(a).unwrap();
        let third = doc.add_numbering_instance(b).unwrap();
        let xml = numbering_xml(&doc);

        let parsed = roxmltree::Document::parse(&xml).unwrap();
        let names: Vec<_> = parsed
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(names, vec!["abstractNum", "abstractNum", "num", "num", "num"]);
        for (num, abstract_id) in [(first, a), (second, a), (third, b)] {
            assert!(xml.contains(&format!(
                "<w:num w:numId=\"{num}\"><w:abstractNumId w:val=\"{abstract_id}\"/>\
                 <w:lvlOverride w:ilvl=\"0\"><w:startOverride w:val=\"1\"/></w:lvlOverride></w:num>"
            )));
        }
        assert!(xml.contains("<w:ind w:left=\"360\" w:hanging=\"360\"/>"));
    }
}
