mod common;

use docxide_html::model::{Alignment, Inline, LineSpacing, RunContent, VertAlign};
use docxide_html::RenderConfig;

#[test]
fn whitespace_collapses_like_a_browser() {
    let doc = common::render("<p>  a   b\n  c  </p>");
    assert_eq!(common::texts(&doc), vec!["a b c"]);
}

#[test]
fn whitespace_collapses_across_inline_elements() {
    let doc = common::render("<p>one <b> two </b> three</p>");
    assert_eq!(common::texts(&doc), vec!["one two three"]);
    assert!(common::run_with_text(&doc, "two").props.bold);
}

#[test]
fn pre_keeps_spaces_and_breaks() {
    let doc = common::render("<pre>a  b\nc</pre>");
    let p = doc.paragraph(common::body_paragraph(&doc, 0));
    assert_eq!(p.text(), "a  b\nc");
    let run = p.runs().next().unwrap();
    assert!(run.content.contains(&RunContent::Break));
    assert!(matches!(
        &run.content[0],
        RunContent::Text { preserve_space: false, .. }
    ));
}

#[test]
fn blocks_become_separate_paragraphs() {
    let doc = common::render("<div>intro<p>first</p>tail</div><p>second</p>");
    assert_eq!(common::texts(&doc), vec!["intro", "first", "tail", "second"]);
}

#[test]
fn line_break_stays_in_paragraph() {
    let doc = common::render("<p>a<br>b</p>");
    assert_eq!(common::texts(&doc), vec!["a\nb"]);
}

#[test]
fn display_none_is_not_rendered() {
    let doc = common::render("<p>shown<span style='display:none'>hidden</span></p><script>x()</script>");
    assert_eq!(common::texts(&doc), vec!["shown"]);
}

#[test]
fn inline_styles_map_to_run_properties() {
    let doc = common::render(
        "<p style='color:#336699;font-family:\"Georgia\", serif'>\
         <i>it</i> <u>un</u> <s>st</s> x<sup>2</sup> <mark>hi</mark></p>",
    );
    let italic = common::run_with_text(&doc, "it");
    assert!(italic.props.italic);
    assert_eq!(italic.props.color, Some([0x33, 0x66, 0x99]));
    assert_eq!(italic.props.font.as_deref(), Some("Georgia"));
    assert!(common::run_with_text(&doc, "un").props.underline.is_some());
    assert!(common::run_with_text(&doc, "st").props.strike);
    assert_eq!(
        common::run_with_text(&doc, "2").props.vert_align,
        VertAlign::Superscript
    );
    assert_eq!(
        common::run_with_text(&doc, "hi").props.shading,
        Some([255, 255, 0])
    );
}

#[test]
fn decoration_none_stops_inherited_underline() {
    let doc = common::render(
        "<p style='text-decoration: underline'>a <span style='text-decoration: none'>b</span></p>",
    );
    assert!(common::run_with_text(&doc, "a").props.underline.is_some());
    assert!(common::run_with_text(&doc, "b").props.underline.is_none());
}

#[test]
fn font_sizes_resolve_against_parent() {
    let doc = common::render(
        "<p style='font-size:12pt'>base <span style='font-size:150%'>big</span> \
         <small>less</small> <span style='font-size:2em'>em</span></p>",
    );
    assert_eq!(common::run_with_text(&doc, "base").props.size, Some(24));
    assert_eq!(common::run_with_text(&doc, "big").props.size, Some(36));
    assert_eq!(common::run_with_text(&doc, "em").props.size, Some(48));
    assert!(common::run_with_text(&doc, "less").props.size.unwrap() < 24);
}

#[test]
fn headings_are_bold_outline_paragraphs() {
    let doc = common::render("<h2>Title</h2><p>body</p>");
    let p = doc.paragraph(common::body_paragraph(&doc, 0));
    assert_eq!(p.props.outline_level, Some(1));
    assert!(p.props.keep_next);
    let run = common::run_with_text(&doc, "Title");
    assert!(run.props.bold);
    assert_eq!(run.props.size, Some(36));
}

#[test]
fn paragraph_geometry_from_css() {
    let doc = common::render(
        "<div style='margin-left:20pt'><p style='text-align:center;padding-left:10pt;\
         margin-bottom:6pt;line-height:18pt;text-indent:-12pt'>x</p></div>",
    );
    let p = doc.paragraph(common::body_paragraph(&doc, 0));
    assert_eq!(p.props.alignment, Some(Alignment::Center));
    assert_eq!(p.props.indent_left, 600);
    assert_eq!(p.props.indent_first_line, -240);
    assert_eq!(p.props.space_after, Some(120));
    assert_eq!(p.props.line_spacing, Some(LineSpacing::AtLeast(360)));
}

#[test]
fn global_font_overrides_css() {
    let config = RenderConfig::default()
        .with_global_font("Arial")
        .with_global_font_size(20);
    let doc = common::render_with(
        "<p style='font-family:Georgia;font-size:30pt'>x</p>",
        config,
    );
    let run = common::run_with_text(&doc, "x");
    assert_eq!(run.props.font.as_deref(), Some("Arial"));
    assert_eq!(run.props.size, Some(20));
}

#[test]
fn links_wrap_their_runs() {
    let doc = common::render("<p>see <a href='https://example.com/'>the <b>site</b></a> or <a href='#top'>top</a></p>");
    let p = doc.paragraph(common::body_paragraph(&doc, 0));
    assert_eq!(p.text(), "see the site or top");
    let links: Vec<_> = p
        .children
        .iter()
        .filter_map(|c| match c {
            Inline::Hyperlink(link) => Some(link),
            _ => None,
        })
        .collect();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].runs.len(), 2);
    let run = common::run_with_text(&doc, "site");
    assert!(run.props.bold);
    assert!(run.props.underline.is_some());
    assert_eq!(run.props.color, Some([0x05, 0x63, 0xC1]));
}

#[test]
fn ruby_becomes_an_eq_field() {
    let doc = common::render("<p><ruby>漢<rp>(</rp><rt>kan</rt><rp>)</rp></ruby>!</p>");
    let p = doc.paragraph(common::body_paragraph(&doc, 0));
    let content: Vec<_> = p.runs().flat_map(|r| r.content.iter()).collect();
    let instr = content
        .iter()
        .find_map(|c| match c {
            RunContent::InstrText(text) => Some(text.clone()),
            _ => None,
        })
        .expect("no field instruction");
    assert!(instr.contains("\"Font:MS Mincho\""));
    assert!(instr.contains("hps11"));
    assert!(instr.contains("\\o\\ad(\\s\\up 10(kan),漢)"));
    assert_eq!(p.text(), "!");
}
