mod common;

use docxide_html::model::{Alignment, BlockRef, ContainerId, VMerge};
use docxide_html::{Error, HtmlRenderer, RenderConfig, dom};

fn cell_text(doc: &docxide_html::Document, row: usize, cell: usize) -> String {
    let table = common::first_table(doc);
    table.rows[row].cells[cell]
        .blocks
        .iter()
        .filter_map(|b| match b {
            BlockRef::Paragraph(id) => Some(doc.paragraph(*id).text()),
            BlockRef::Table(_) => None,
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[test]
fn rowspan_produces_merge_continuation() {
    let doc = common::render(
        "<table><tr><td rowspan='2'>A</td><td>B</td></tr><tr><td>C</td></tr></table>",
    );
    let table = common::first_table(&doc);
    assert_eq!(table.grid, vec![4680, 4680]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].cells[0].props.v_merge, VMerge::Restart);
    assert_eq!(table.rows[1].cells.len(), 2);
    assert_eq!(table.rows[1].cells[0].props.v_merge, VMerge::Continue);
    assert_eq!(cell_text(&doc, 0, 0), "A");
    assert_eq!(cell_text(&doc, 0, 1), "B");
    assert_eq!(cell_text(&doc, 1, 1), "C");
    assert_eq!(cell_text(&doc, 1, 0), "");
}

#[test]
fn body_ends_with_paragraph_after_table() {
    let doc = common::render("<table><tr><td>x</td></tr></table>");
    assert!(matches!(doc.body().last(), Some(BlockRef::Paragraph(_))));
    assert!(matches!(doc.body().first(), Some(BlockRef::Table(_))));
}

#[test]
fn grid_sums_to_table_width() {
    let doc = common::render(
        "<table style='width:7in'><tr><td style='width:1in'>a</td><td colspan='2'>b</td>\
         <td style='width:30%'>c</td></tr><tr><td>d</td><td>e</td><td>f</td><td>g</td></tr></table>",
    );
    let table = common::first_table(&doc);
    // 7in is wider than the 6.5in text column, so the table is capped
    assert_eq!(table.props.width, 9360);
    // the 1in column keeps its size; 25%, 25% and 30% split the rest
    assert_eq!(table.grid, vec![1440, 2475, 2475, 2970]);
    assert_eq!(table.grid.iter().sum::<i64>(), table.props.width);
    assert_eq!(
        table.rows[0].cells[1].props.width,
        table.grid[1] + table.grid[2]
    );
    assert_eq!(table.rows[0].cells[1].props.grid_span, 2);
}

#[test]
fn percentage_width_resolves_against_container() {
    let doc = common::render("<table width='50%'><tr><td>a</td><td>b</td></tr></table>");
    let table = common::first_table(&doc);
    assert_eq!(table.props.width, 4680);
    assert_eq!(table.grid, vec![2340, 2340]);
}

#[test]
fn percentage_table_apportions_absolute_cells() {
    // 1in of a 4680 twip table counts as about 30.8% next to the 50% cell
    let doc = common::render(
        "<table width='50%'><tr><td style='width:1in'>a</td><td width='50%'>b</td></tr></table>",
    );
    let table = common::first_table(&doc);
    assert_eq!(table.props.width, 4680);
    assert_eq!(table.grid, vec![1783, 2897]);
}

#[test]
fn nested_table_sizes_against_its_cell() {
    let doc = common::render(
        "<table><tr><td><table style='width:100%'><tr><td>inner</td></tr></table></td>\
         <td>right</td></tr></table>",
    );
    let outer = common::first_table(&doc);
    let cell = &outer.rows[0].cells[0];
    let inner_id = cell
        .blocks
        .iter()
        .find_map(|b| match b {
            BlockRef::Table(id) => Some(*id),
            BlockRef::Paragraph(_) => None,
        })
        .expect("nested table");
    let inner = doc.table(inner_id);
    // 4680 twips column minus the default left and right cell margins
    assert_eq!(inner.props.width, 4680 - 216);
    // a cell has to end with a paragraph
    assert!(matches!(cell.blocks.last(), Some(BlockRef::Paragraph(_))));
    // no default grid border for a nested table unless configured
    assert!(inner.props.borders.outer.is_empty());
    assert!(!outer.props.borders.outer.is_empty());
}

#[test]
fn nested_table_border_can_be_enabled() {
    let doc = common::render_with(
        "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>",
        RenderConfig::default().with_table_in_cell_border(true),
    );
    let outer = common::first_table(&doc);
    let inner_id = outer.rows[0].cells[0]
        .blocks
        .iter()
        .find_map(|b| match b {
            BlockRef::Table(id) => Some(*id),
            BlockRef::Paragraph(_) => None,
        })
        .unwrap();
    assert!(!doc.table(inner_id).props.borders.outer.is_empty());
}

#[test]
fn header_rows_cells_and_attributes() {
    let doc = common::render(
        "<table border='0' align='center'><thead><tr><th>H</th></tr></thead>\
         <tbody><tr style='background-color:#eeeeee' valign='bottom'><td>v</td></tr></tbody></table>",
    );
    let table = common::first_table(&doc);
    assert_eq!(table.props.alignment, Some(Alignment::Center));
    assert!(table.props.borders.outer.is_empty());
    assert!(table.rows[0].header);
    assert!(!table.rows[1].header);
    assert_eq!(table.rows[1].cells[0].props.shading, Some([0xee, 0xee, 0xee]));

    let header = common::run_with_text(&doc, "H");
    assert!(header.props.bold);
    let BlockRef::Paragraph(p) = table.rows[0].cells[0].blocks[0] else {
        panic!("cell starts with a table");
    };
    assert_eq!(doc.paragraph(p).props.alignment, Some(Alignment::Center));
}

#[test]
fn local_percentage_inside_cell() {
    let uri = common::png_data_uri(200, 50);
    let doc = common::render(&format!(
        "<table><tr><td><img src='{uri}' style='width:50%'></td><td>x</td></tr></table>"
    ));
    let drawings = common::drawings(&doc);
    assert_eq!(drawings.len(), 1);
    // half of (4680 - 216) twips, in EMU
    assert_eq!(drawings[0].width_emu, 1_417_320);
    assert_eq!(drawings[0].height_emu, 354_330);
}

#[test]
fn cell_outside_table_is_fatal() {
    let mut doc = docxide_html::Document::default();
    let mut root = dom::Element::new("body").with_child(dom::Element::new("td").with_text("x"));
    let result = HtmlRenderer::default().render_into(&mut doc, ContainerId::Body, None, &mut root);
    assert!(matches!(result, Err(Error::NoEnclosingTable)));
}
