mod common;

use docxide_html::model::{NumberFormat, ParagraphProperties};
use docxide_html::RenderConfig;

fn numbering_of(doc: &docxide_html::Document, text: &str) -> Option<(u32, u8)> {
    common::paragraphs(doc)
        .into_iter()
        .find(|p| p.text() == text)
        .and_then(|p| p.props.numbering)
        .map(|n| (n.num_id, n.level))
}

#[test]
fn nested_lists_number_each_level() {
    let doc = common::render(
        "<ul>\n  <li>a\n    <ul>\n      <li>b</li>\n    </ul>\n  </li>\n  <li>c</li>\n</ul>",
    );
    assert_eq!(common::texts(&doc), vec!["a", "b", "c"]);

    let (outer, outer_level) = numbering_of(&doc, "a").expect("a is numbered");
    let (inner, inner_level) = numbering_of(&doc, "b").expect("b is numbered");
    assert_eq!(outer_level, 0);
    assert_eq!(inner_level, 1);
    assert_eq!(numbering_of(&doc, "c"), Some((outer, 0)));

    assert_ne!(outer, inner);
    let inner_def = doc.numbering_definition(inner).unwrap();
    assert_eq!(inner_def.levels.len(), 2);
    assert_eq!(inner_def.levels[0].format, NumberFormat::Bullet);
    assert_eq!(inner_def.levels[0].text, "\u{2022}");
    assert_eq!(inner_def.levels[1].text, "\u{25E6}");
    assert_eq!(inner_def.levels[0].indent_left, 360);
    assert_eq!(inner_def.levels[1].indent_left, 720);
    assert_eq!(inner_def.levels[1].hanging, 360);
}

#[test]
fn identical_lists_share_a_definition() {
    let doc = common::render("<ol><li>x</li></ol><p>between</p><ol><li>y</li></ol>");
    let (first, _) = numbering_of(&doc, "x").unwrap();
    let (second, _) = numbering_of(&doc, "y").unwrap();
    // each list restarts at 1, so each gets its own instance of one definition
    assert_ne!(first, second);
    assert_eq!(
        doc.numbering_definition(first).map(|d| d.abstract_id),
        doc.numbering_definition(second).map(|d| d.abstract_id)
    );
    assert_eq!(doc.numbering().len(), 1);
    assert_eq!(doc.numbering_instances().len(), 2);
    for instance in doc.numbering_instances() {
        assert_eq!(instance.start_overrides, vec![1]);
    }
    assert_eq!(doc.numbering()[0].levels[0].format, NumberFormat::Decimal);
    assert_eq!(doc.numbering()[0].levels[0].text, "%1.");
}

#[test]
fn list_type_and_start_make_distinct_definitions() {
    let doc = common::render(
        "<ol type='a'><li>x</li></ol><ol start='3' style='list-style-type:upper-roman'><li>y</li></ol>",
    );
    assert_eq!(doc.numbering().len(), 2);
    let (x, _) = numbering_of(&doc, "x").unwrap();
    let (y, _) = numbering_of(&doc, "y").unwrap();
    let def = |id| doc.numbering_definition(id).unwrap();
    assert_eq!(def(x).levels[0].format, NumberFormat::LowerLetter);
    assert_eq!(def(y).levels[0].format, NumberFormat::UpperRoman);
    assert_eq!(def(y).levels[0].start, 3);
}

#[test]
fn bare_list_item_is_a_plain_paragraph() {
    let doc = common::render("<li>lonely</li>");
    assert_eq!(common::texts(&doc), vec!["lonely"]);
    assert_eq!(numbering_of(&doc, "lonely"), None);
    assert!(doc.numbering().is_empty());
}

#[test]
fn numbered_paragraphs_leave_indentation_to_the_level() {
    let doc = common::render_with(
        "<ul style='margin-left:10pt'><li>item</li></ul>",
        RenderConfig::default().with_numbering_indent(400),
    );
    let p = common::paragraphs(&doc)
        .into_iter()
        .find(|p| p.text() == "item")
        .unwrap();
    assert_eq!(p.props.indent_left, 0);
    assert_eq!(p.props.indent_first_line, 0);
    assert_ne!(p.props, ParagraphProperties::default());
    // base indent plus the list's own margin
    assert_eq!(doc.numbering()[0].levels[0].indent_left, 400 + 200);
}
