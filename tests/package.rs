mod common;

use std::sync::Arc;

use docxide_html::css::Declaration;
use docxide_html::dom::Element;
use docxide_html::model::Inline;
use docxide_html::{
    Document, Error, Flow, HtmlRenderer, MathConverter, MathKind, RenderConfig, RenderContext,
    TagPolicy, render_html_to_docx, write_docx,
};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn sample_docx() -> Vec<u8> {
    let uri = common::png_data_uri(8, 8);
    let html = format!(
        "<h1>Report</h1>\
         <p>See <a href='https://example.com/a?b=1&amp;c=2'>this</a> and \
         <a href='https://example.com/a?b=1&amp;c=2'>again</a>.</p>\
         <ol><li>one</li><li>two</li></ol>\
         <table><tr><td>cell</td><td><img src='{uri}'></td></tr></table>"
    );
    render_html_to_docx(&html, RenderConfig::default()).expect("conversion failed")
}

#[test]
fn package_contains_expected_parts() {
    let docx = sample_docx();
    let names = common::part_names(&docx);
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/_rels/document.xml.rels",
        "word/styles.xml",
        "word/numbering.xml",
        "word/media/image1.png",
    ] {
        assert!(names.iter().any(|n| n == part), "missing {part}: {names:?}");
    }
}

#[test]
fn document_part_is_well_formed() {
    let docx = sample_docx();
    let xml = common::read_part(&docx, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).expect("document.xml is not well-formed");
    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((WML_NS, "body")))
        .expect("no body");

    let tables = body
        .children()
        .filter(|n| n.has_tag_name((WML_NS, "tbl")))
        .count();
    assert_eq!(tables, 1);
    // the section properties come last, after a closing paragraph
    let elements: Vec<_> = body.children().filter(|n| n.is_element()).collect();
    assert!(elements.last().unwrap().has_tag_name((WML_NS, "sectPr")));
    assert!(elements[elements.len() - 2].has_tag_name((WML_NS, "p")));

    let numbered = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "numPr")))
        .count();
    assert_eq!(numbered, 2);

    let links = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "hyperlink")))
        .count();
    assert_eq!(links, 2);
}

#[test]
fn hyperlink_relationships_are_shared() {
    let docx = sample_docx();
    let rels = common::read_part(&docx, "word/_rels/document.xml.rels");
    let doc = roxmltree::Document::parse(&rels).unwrap();
    let external: Vec<_> = doc
        .descendants()
        .filter(|n| n.attribute("TargetMode") == Some("External"))
        .collect();
    assert_eq!(external.len(), 1);
    assert_eq!(
        external[0].attribute("Target"),
        Some("https://example.com/a?b=1&c=2")
    );
    assert!(
        doc.descendants()
            .any(|n| n.attribute("Target") == Some("media/image1.png"))
    );
}

#[test]
fn numbering_part_lists_definitions() {
    let docx = sample_docx();
    let xml = common::read_part(&docx, "word/numbering.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let abstracts = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "abstractNum")))
        .count();
    let instances = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "num")))
        .count();
    assert_eq!((abstracts, instances), (1, 1));
    assert!(xml.contains("w:val=\"decimal\""));
}

#[test]
fn sibling_lists_restart_their_numbering() {
    let docx = render_html_to_docx(
        "<ol><li>a</li><li>b</li></ol><p>between</p><ol><li>c</li></ol>",
        RenderConfig::default(),
    )
    .unwrap();
    let xml = common::read_part(&docx, "word/numbering.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let abstracts = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "abstractNum")))
        .count();
    assert_eq!(abstracts, 1);

    let nums: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "num")))
        .collect();
    assert_eq!(nums.len(), 2);
    for num in &nums {
        let start = num
            .descendants()
            .find(|n| n.has_tag_name((WML_NS, "startOverride")))
            .and_then(|n| n.attribute((WML_NS, "val")));
        assert_eq!(start, Some("1"));
    }

    // paragraphs of the second list point at the second instance
    let body = common::read_part(&docx, "word/document.xml");
    let body = roxmltree::Document::parse(&body).unwrap();
    let num_ids: Vec<_> = body
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "numId")))
        .filter_map(|n| n.attribute((WML_NS, "val")))
        .collect();
    assert_eq!(num_ids, vec!["1", "1", "2"]);
}

#[test]
fn control_characters_do_not_break_the_package() {
    let docx = render_html_to_docx(
        "<p title='t\u{2}'>a\u{1}b\u{8}c</p><pre>x\u{1B}y</pre>",
        RenderConfig::default(),
    )
    .unwrap();
    let xml = common::read_part(&docx, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).expect("document.xml is not well-formed");
    let text: String = doc
        .descendants()
        .filter(|n| n.has_tag_name((WML_NS, "t")))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(text, "abcxy");
}

#[test]
fn empty_document_still_packages() {
    let docx = write_docx(&Document::default()).unwrap();
    assert!(!common::part_names(&docx).iter().any(|n| n.starts_with("word/media/")));
    let xml = common::read_part(&docx, "word/document.xml");
    assert!(roxmltree::Document::parse(&xml).is_ok());
}

struct KeyboardPolicy;

impl TagPolicy for KeyboardPolicy {
    fn tags(&self) -> &[&str] {
        &["kbd"]
    }

    fn default_style(&self, _el: &Element) -> Option<Declaration> {
        Some(Declaration::from_pairs(&[("font-family", "Courier New")]))
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        ctx.render_text(&el.text_content().to_uppercase())?;
        Ok(Flow::Skip)
    }
}

struct PlainPolicy;

impl TagPolicy for PlainPolicy {
    fn tags(&self) -> &[&str] {
        &["b"]
    }

    fn start(&self, _el: &mut Element, _ctx: &mut RenderContext) -> Result<Flow, Error> {
        Ok(Flow::Descend)
    }
}

#[test]
fn custom_policies_overlay_builtins() {
    let config = RenderConfig::default()
        .with_policy(Arc::new(KeyboardPolicy))
        .with_policy(Arc::new(PlainPolicy));
    let doc = common::render_with("<p>press <kbd>ctrl</kbd> <b>now</b></p>", config);

    let key = common::run_with_text(&doc, "CTRL");
    assert_eq!(key.props.font.as_deref(), Some("Courier New"));
    assert!(!common::run_with_text(&doc, "now").props.bold);

    // the shared built-in registry is untouched
    let doc = common::render("<p><b>now</b></p>");
    assert!(common::run_with_text(&doc, "now").props.bold);
}

struct EchoMath;

impl MathConverter for EchoMath {
    fn convert(&self, source: &str, kind: MathKind) -> Result<String, Error> {
        match kind {
            MathKind::Latex if source == "bad" => Err(Error::Math("unsupported".into())),
            MathKind::Latex => Ok(format!("<m:oMath><m:r><m:t>{source}</m:t></m:r></m:oMath>")),
            MathKind::MathMl => Ok("<m:oMath><m:r><m:t>mathml</m:t></m:r></m:oMath>".into()),
        }
    }
}

fn math_islands(doc: &Document) -> Vec<String> {
    common::paragraphs(doc)
        .iter()
        .flat_map(|p| p.children.iter())
        .filter_map(|c| match c {
            Inline::Math(omml) => Some(omml.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn formulas_go_through_the_converter() {
    let renderer = HtmlRenderer::new(RenderConfig::default()).with_math_converter(EchoMath);
    let mut doc = Document::default();
    renderer
        .render_html(
            &mut doc,
            "<p>x <span class='math-tex'>\\(a+b\\)</span> y \
             <span class='math-tex'>bad</span><math><mi>z</mi></math></p>",
        )
        .unwrap();
    let islands = math_islands(&doc);
    assert_eq!(islands.len(), 2);
    assert!(islands[0].contains("<m:t>a+b</m:t>"));
    assert!(islands[1].contains("mathml"));

    let xml = common::read_part(&write_docx(&doc).unwrap(), "word/document.xml");
    assert!(xml.contains("<m:oMath>"));
    assert!(roxmltree::Document::parse(&xml).is_ok());
}

#[test]
fn formulas_are_skipped_without_converter() {
    let doc = common::render("<p>x <span class='math-tex'>\\(a\\)</span> y</p>");
    assert!(math_islands(&doc).is_empty());
    assert_eq!(common::texts(&doc), vec!["x y"]);
}
