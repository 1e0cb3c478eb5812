use std::fmt::Write;

use crate::css::to_hex;
use crate::dom::{escape_xml_attr, escape_xml_text};
use crate::model::{
    Alignment, BlockRef, Border, BorderStyle, Borders, CellVAlign, Document, Drawing,
    FieldCharType, Hyperlink, HyperlinkTarget, ImageFormat, Inline, LineSpacing, Paragraph,
    ParagraphProperties, Run, RunContent, RunProperties, Table, TableCell, TableRow,
    UnderlineStyle, VMerge, VertAlign,
};

use super::{DML_NS, MATH_NS, PIC_NS, REL_NS, Relationships, WML_NS, WPD_NS, XML_DECL};

const SVG_BLIP_EXT: &str = "{96DAC541-7B7A-43D3-8B79-37D633B846F1}";
const SVG_NS: &str = "http://schemas.microsoft.com/office/drawing/2016/SVG/main";

/// `word/document.xml` for `doc`, with relationship ids numbered as the
/// package writer numbers them.
pub fn document_xml(doc: &Document) -> String {
    write_document(doc, &mut Relationships::new())
}

pub(super) fn write_document(doc: &Document, rels: &mut Relationships) -> String {
    let mut out = String::from(XML_DECL);
    let _ = write!(
        out,
        "<w:document xmlns:w=\"{WML_NS}\" xmlns:r=\"{REL_NS}\" xmlns:wp=\"{WPD_NS}\" \
         xmlns:a=\"{DML_NS}\" xmlns:pic=\"{PIC_NS}\" xmlns:m=\"{MATH_NS}\"><w:body>"
    );
    let mut writer = BodyWriter { doc, rels, out };
    writer.blocks(doc.body());
    writer.section();
    writer.out.push_str("</w:body></w:document>");
    writer.out
}

fn color_attr(color: Option<[u8; 3]>) -> String {
    color.map_or_else(|| "auto".to_string(), to_hex)
}

fn border_val(style: BorderStyle) -> &'static str {
    match style {
        BorderStyle::Single => "single",
        BorderStyle::Dotted => "dotted",
        BorderStyle::Dashed => "dashed",
        BorderStyle::Double => "double",
        BorderStyle::ThreeDEngrave => "threeDEngrave",
        BorderStyle::ThreeDEmboss => "threeDEmboss",
        BorderStyle::Inset => "inset",
        BorderStyle::Outset => "outset",
    }
}

fn jc_val(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn underline_val(style: UnderlineStyle) -> &'static str {
    match style {
        UnderlineStyle::Single => "single",
        UnderlineStyle::Double => "double",
        UnderlineStyle::Dotted => "dotted",
        UnderlineStyle::Dash => "dash",
        UnderlineStyle::Wave => "wave",
    }
}

struct BodyWriter<'a> {
    doc: &'a Document,
    rels: &'a mut Relationships,
    out: String,
}

impl BodyWriter<'_> {
    fn blocks(&mut self, blocks: &[BlockRef]) {
        let doc = self.doc;
        for block in blocks {
            match *block {
                BlockRef::Paragraph(id) => self.paragraph(doc.paragraph(id)),
                BlockRef::Table(id) => self.table(doc.table(id)),
            }
        }
    }

    fn section(&mut self) {
        let page = self.doc.page;
        let _ = write!(
            self.out,
            "<w:sectPr><w:pgSz w:w=\"{}\" w:h=\"{}\"/>\
             <w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" \
             w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr>",
            page.width,
            page.height,
            page.margin_top,
            page.margin_right,
            page.margin_bottom,
            page.margin_left,
        );
    }

    fn border(&mut self, tag: &str, border: Option<Border>) {
        let Some(border) = border else {
            return;
        };
        let _ = write!(
            self.out,
            "<w:{tag} w:val=\"{}\" w:sz=\"{}\" w:space=\"0\" w:color=\"{}\"/>",
            border_val(border.style),
            border.size,
            color_attr(border.color),
        );
    }

    fn box_borders(&mut self, tag: &str, borders: &Borders) {
        if borders.is_empty() {
            return;
        }
        let _ = write!(self.out, "<w:{tag}>");
        self.border("top", borders.top);
        self.border("left", borders.left);
        self.border("bottom", borders.bottom);
        self.border("right", borders.right);
        let _ = write!(self.out, "</w:{tag}>");
    }

    fn shading(&mut self, fill: Option<[u8; 3]>) {
        if let Some(fill) = fill {
            let _ = write!(
                self.out,
                "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
                to_hex(fill)
            );
        }
    }

    // -- paragraphs -------------------------------------------------------

    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.out.push_str("<w:p>");
        self.paragraph_properties(&paragraph.props);
        for child in &paragraph.children {
            match child {
                Inline::Run(run) => self.run(run),
                Inline::Hyperlink(link) => self.hyperlink(link),
                Inline::Math(omml) => self.out.push_str(omml),
            }
        }
        self.out.push_str("</w:p>");
    }

    fn paragraph_properties(&mut self, props: &ParagraphProperties) {
        if *props == ParagraphProperties::default() {
            return;
        }
        self.out.push_str("<w:pPr>");
        if props.keep_next {
            self.out.push_str("<w:keepNext/>");
        }
        if props.page_break_before {
            self.out.push_str("<w:pageBreakBefore/>");
        }
        if let Some(num) = props.numbering {
            let _ = write!(
                self.out,
                "<w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{}\"/></w:numPr>",
                num.level, num.num_id
            );
        }
        self.box_borders("pBdr", &props.borders);
        self.shading(props.shading);

        if props.space_before.is_some() || props.space_after.is_some() || props.line_spacing.is_some()
        {
            self.out.push_str("<w:spacing");
            if let Some(before) = props.space_before {
                let _ = write!(self.out, " w:before=\"{before}\"");
            }
            if let Some(after) = props.space_after {
                let _ = write!(self.out, " w:after=\"{after}\"");
            }
            match props.line_spacing {
                Some(LineSpacing::Auto(line)) => {
                    let _ = write!(self.out, " w:line=\"{line}\" w:lineRule=\"auto\"");
                }
                Some(LineSpacing::Exact(line)) => {
                    let _ = write!(self.out, " w:line=\"{line}\" w:lineRule=\"exact\"");
                }
                Some(LineSpacing::AtLeast(line)) => {
                    let _ = write!(self.out, " w:line=\"{line}\" w:lineRule=\"atLeast\"");
                }
                None => {}
            }
            self.out.push_str("/>");
        }

        // numbered paragraphs take their indentation from the list level
        if props.indent_left != 0 || props.indent_right != 0 || props.indent_first_line != 0 {
            self.out.push_str("<w:ind");
            if props.indent_left != 0 {
                let _ = write!(self.out, " w:left=\"{}\"", props.indent_left);
            }
            if props.indent_right != 0 {
                let _ = write!(self.out, " w:right=\"{}\"", props.indent_right);
            }
            match props.indent_first_line {
                0 => {}
                n if n > 0 => {
                    let _ = write!(self.out, " w:firstLine=\"{n}\"");
                }
                n => {
                    let _ = write!(self.out, " w:hanging=\"{}\"", -n);
                }
            }
            self.out.push_str("/>");
        }

        if let Some(alignment) = props.alignment {
            let _ = write!(self.out, "<w:jc w:val=\"{}\"/>", jc_val(alignment));
        }
        if let Some(level) = props.outline_level {
            let _ = write!(self.out, "<w:outlineLvl w:val=\"{level}\"/>");
        }
        self.out.push_str("</w:pPr>");
    }

    fn hyperlink(&mut self, link: &Hyperlink) {
        match &link.target {
            HyperlinkTarget::External(url) => {
                let id = self.rels.hyperlink(url);
                let _ = write!(self.out, "<w:hyperlink r:id=\"{id}\" w:history=\"1\">");
            }
            HyperlinkTarget::Anchor(anchor) => {
                self.out.push_str("<w:hyperlink w:anchor=\"");
                escape_xml_attr(anchor, &mut self.out);
                self.out.push_str("\" w:history=\"1\">");
            }
        }
        for run in &link.runs {
            self.run(run);
        }
        self.out.push_str("</w:hyperlink>");
    }

    // -- runs -------------------------------------------------------------

    fn run(&mut self, run: &Run) {
        if run.content.is_empty() {
            return;
        }
        self.out.push_str("<w:r>");
        self.run_properties(&run.props);
        for content in &run.content {
            match content {
                RunContent::Text {
                    text,
                    preserve_space,
                } => {
                    if *preserve_space {
                        self.out.push_str("<w:t xml:space=\"preserve\">");
                    } else {
                        self.out.push_str("<w:t>");
                    }
                    escape_xml_text(text, &mut self.out);
                    self.out.push_str("</w:t>");
                }
                RunContent::Break => self.out.push_str("<w:br/>"),
                RunContent::Tab => self.out.push_str("<w:tab/>"),
                RunContent::Drawing(drawing) => self.drawing(drawing),
                RunContent::FieldChar(kind) => {
                    let kind = match kind {
                        FieldCharType::Begin => "begin",
                        FieldCharType::Separate => "separate",
                        FieldCharType::End => "end",
                    };
                    let _ = write!(self.out, "<w:fldChar w:fldCharType=\"{kind}\"/>");
                }
                RunContent::InstrText(instr) => {
                    self.out.push_str("<w:instrText xml:space=\"preserve\">");
                    escape_xml_text(instr, &mut self.out);
                    self.out.push_str("</w:instrText>");
                }
            }
        }
        self.out.push_str("</w:r>");
    }

    fn run_properties(&mut self, props: &RunProperties) {
        if *props == RunProperties::default() {
            return;
        }
        self.out.push_str("<w:rPr>");
        if let Some(font) = &props.font {
            let mut name = String::new();
            escape_xml_attr(font, &mut name);
            let _ = write!(
                self.out,
                "<w:rFonts w:ascii=\"{name}\" w:hAnsi=\"{name}\" w:eastAsia=\"{name}\" w:cs=\"{name}\"/>"
            );
        }
        if props.bold {
            self.out.push_str("<w:b/><w:bCs/>");
        }
        if props.italic {
            self.out.push_str("<w:i/><w:iCs/>");
        }
        if props.caps {
            self.out.push_str("<w:caps/>");
        }
        if props.small_caps {
            self.out.push_str("<w:smallCaps/>");
        }
        if props.strike {
            self.out.push_str("<w:strike/>");
        }
        if props.vanish {
            self.out.push_str("<w:vanish/>");
        }
        if let Some(color) = props.color {
            let _ = write!(self.out, "<w:color w:val=\"{}\"/>", to_hex(color));
        }
        if let Some(spacing) = props.spacing {
            let _ = write!(self.out, "<w:spacing w:val=\"{spacing}\"/>");
        }
        if let Some(size) = props.size {
            let _ = write!(self.out, "<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>");
        }
        if let Some(underline) = props.underline {
            let _ = write!(self.out, "<w:u w:val=\"{}\"", underline_val(underline));
            if let Some(color) = props.underline_color {
                let _ = write!(self.out, " w:color=\"{}\"", to_hex(color));
            }
            self.out.push_str("/>");
        }
        self.shading(props.shading);
        match props.vert_align {
            VertAlign::Baseline => {}
            VertAlign::Superscript => self.out.push_str("<w:vertAlign w:val=\"superscript\"/>"),
            VertAlign::Subscript => self.out.push_str("<w:vertAlign w:val=\"subscript\"/>"),
        }
        self.out.push_str("</w:rPr>");
    }

    fn drawing(&mut self, drawing: &Drawing) {
        let doc = self.doc;
        let Some(media) = doc.media().get(drawing.media.index()) else {
            log::warn!("Drawing {} refers to missing media", drawing.id);
            return;
        };
        let rid = self.rels.image(drawing.media.index(), media.format);
        let mut name = String::new();
        escape_xml_attr(&drawing.name, &mut name);
        let (cx, cy) = (drawing.width_emu, drawing.height_emu);

        // SVG goes in through the Office 2016 svgBlip extension
        let blip = if media.format == ImageFormat::Svg {
            format!(
                "<a:blip r:embed=\"{rid}\"><a:extLst><a:ext uri=\"{SVG_BLIP_EXT}\">\
                 <asvg:svgBlip xmlns:asvg=\"{SVG_NS}\" r:embed=\"{rid}\"/></a:ext></a:extLst></a:blip>"
            )
        } else {
            format!("<a:blip r:embed=\"{rid}\"/>")
        };

        let _ = write!(
            self.out,
            "<w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
             <wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
             <wp:effectExtent l=\"0\" t=\"0\" r=\"0\" b=\"0\"/>\
             <wp:docPr id=\"{id}\" name=\"{name}\"/>\
             <wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>\
             <a:graphic><a:graphicData uri=\"{PIC_NS}\"><pic:pic>\
             <pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>\
             <pic:blipFill>{blip}<a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
             <pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>\
             </pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>",
            id = drawing.id,
        );
    }

    // -- tables -----------------------------------------------------------

    fn table(&mut self, table: &Table) {
        self.out.push_str("<w:tbl><w:tblPr>");
        let _ = write!(self.out, "<w:tblW w:w=\"{}\" w:type=\"dxa\"/>", table.props.width);
        if let Some(alignment) = table.props.alignment {
            let _ = write!(self.out, "<w:jc w:val=\"{}\"/>", jc_val(alignment));
        }
        let borders = table.props.borders;
        if !borders.outer.is_empty() || borders.inside_h.is_some() || borders.inside_v.is_some() {
            self.out.push_str("<w:tblBorders>");
            self.border("top", borders.outer.top);
            self.border("left", borders.outer.left);
            self.border("bottom", borders.outer.bottom);
            self.border("right", borders.outer.right);
            self.border("insideH", borders.inside_h);
            self.border("insideV", borders.inside_v);
            self.out.push_str("</w:tblBorders>");
        }
        self.out.push_str("<w:tblLayout w:type=\"fixed\"/>");
        self.out.push_str("<w:tblLook w:val=\"0000\"/></w:tblPr><w:tblGrid>");
        for width in &table.grid {
            let _ = write!(self.out, "<w:gridCol w:w=\"{width}\"/>");
        }
        self.out.push_str("</w:tblGrid>");
        for row in &table.rows {
            self.row(row);
        }
        self.out.push_str("</w:tbl>");
    }

    fn row(&mut self, row: &TableRow) {
        self.out.push_str("<w:tr>");
        if row.header || row.height.is_some() {
            self.out.push_str("<w:trPr>");
            if let Some(height) = row.height {
                let _ = write!(self.out, "<w:trHeight w:val=\"{height}\" w:hRule=\"atLeast\"/>");
            }
            if row.header {
                self.out.push_str("<w:tblHeader/>");
            }
            self.out.push_str("</w:trPr>");
        }
        for cell in &row.cells {
            self.cell(cell);
        }
        self.out.push_str("</w:tr>");
    }

    fn cell(&mut self, cell: &TableCell) {
        let props = &cell.props;
        self.out.push_str("<w:tc><w:tcPr>");
        let _ = write!(self.out, "<w:tcW w:w=\"{}\" w:type=\"dxa\"/>", props.width);
        if props.grid_span > 1 {
            let _ = write!(self.out, "<w:gridSpan w:val=\"{}\"/>", props.grid_span);
        }
        match props.v_merge {
            VMerge::None => {}
            VMerge::Restart => self.out.push_str("<w:vMerge w:val=\"restart\"/>"),
            VMerge::Continue => self.out.push_str("<w:vMerge/>"),
        }
        self.box_borders("tcBorders", &props.borders);
        self.shading(props.shading);
        if let Some(v_align) = props.v_align {
            let val = match v_align {
                CellVAlign::Top => "top",
                CellVAlign::Center => "center",
                CellVAlign::Bottom => "bottom",
            };
            let _ = write!(self.out, "<w:vAlign w:val=\"{val}\"/>");
        }
        self.out.push_str("</w:tcPr>");
        if cell.blocks.is_empty() {
            // a cell must hold at least one paragraph
            self.out.push_str("<w:p/>");
        } else {
            self.blocks(&cell.blocks);
        }
        self.out.push_str("</w:tc>");
    }
}
