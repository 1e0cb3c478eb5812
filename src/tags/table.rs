//! Tables: column grid synthesis and the `table`/`td`/`th` policies.
//!
//! HTML tables describe cells row by row with spans; WordprocessingML wants a
//! fixed column grid, with every row listing its cells (merge continuations
//! included) left to right. Layout walks the rows once, tracking cells that
//! span down from earlier rows, and reconciles the declared column widths
//! into a grid that adds up to the table width.

use std::collections::BTreeMap;

use crate::css::{Declaration, element_declaration};
use crate::dom::Element;
use crate::error::Error;
use crate::model::{
    Alignment, BlockRef, Border, Borders, CellProperties, CellVAlign, ContainerId, Table,
    TableBorders, TableCell, TableProperties, TableRow, VMerge,
};
use crate::render::{RenderContext, TableFrame, color_value};
use crate::units::{EMU_PER_PX, Length, emu_to_eighth_points, emu_to_twips};

use super::{Flow, TagPolicy, push_synthetic_style};

/// Attribute stamped on laid-out cells: `"<row>,<cell>"` in the output table.
const CELL_ATTR: &str = "data-docx-cell";

const MAX_COLSPAN: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnWidth {
    /// EMU.
    Absolute(i64),
    Percent(f64),
}

impl ColumnWidth {
    fn is_percent(self) -> bool {
        matches!(self, ColumnWidth::Percent(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSpec {
    pub rowspan: usize,
    pub colspan: usize,
    pub width: Option<ColumnWidth>,
}

impl CellSpec {
    pub fn new(rowspan: usize, colspan: usize) -> Self {
        Self {
            rowspan: rowspan.max(1),
            colspan: colspan.clamp(1, MAX_COLSPAN),
            width: None,
        }
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableSpec {
    pub rows: Vec<Vec<CellSpec>>,
    /// Resolved table width in EMU.
    pub width: i64,
    /// The table declared its own width. Columns are then resolved as shares
    /// of that width instead of being apportioned proportionally.
    pub explicit: bool,
    /// The table's width is a percentage (or absent); percent column widths
    /// win reconciliation.
    pub prefers_percent: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// Index of the source cell in row-major declaration order.
    Real { source: usize, rowspan: usize },
    Continuation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedCell {
    pub column: usize,
    pub colspan: usize,
    pub kind: CellKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableLayout {
    pub rows: Vec<Vec<PlacedCell>>,
    /// Column widths in twips; they add up to `width`.
    pub grid: Vec<i64>,
    /// Twips.
    pub width: i64,
}

impl TableLayout {
    pub fn cell_width(&self, cell: &PlacedCell) -> i64 {
        let end = (cell.column + cell.colspan).min(self.grid.len());
        self.grid[cell.column.min(end)..end].iter().sum()
    }
}

#[derive(Clone, Copy, Debug)]
struct SpanMarker {
    remaining: usize,
    colspan: usize,
    active: bool,
}

/// Lay out `spec` into rows of placed cells and a column grid.
pub fn layout_table(spec: &TableSpec) -> TableLayout {
    let mut markers: BTreeMap<usize, SpanMarker> = BTreeMap::new();
    let mut widths: BTreeMap<usize, ColumnWidth> = BTreeMap::new();
    let mut rows = Vec::with_capacity(spec.rows.len());
    let mut columns = 0;
    let mut source = 0;

    for row in &spec.rows {
        let active: Vec<(usize, usize)> = markers
            .iter()
            .filter(|(_, m)| m.active)
            .map(|(&start, m)| (start, m.colspan))
            .collect();
        let mut next_marker = 0;
        let mut placed = Vec::new();
        let mut column = 0;
        let mut min_rowspan: Option<usize> = None;

        for cell in row {
            while let Some(&(start, span)) = active.get(next_marker) {
                if start > column {
                    break;
                }
                placed.push(PlacedCell {
                    column,
                    colspan: span,
                    kind: CellKind::Continuation,
                });
                column += span;
                next_marker += 1;
            }

            placed.push(PlacedCell {
                column,
                colspan: cell.colspan,
                kind: CellKind::Real {
                    source,
                    rowspan: cell.rowspan,
                },
            });
            source += 1;
            if cell.rowspan > 1 {
                markers.insert(
                    column,
                    SpanMarker {
                        remaining: cell.rowspan - 1,
                        colspan: cell.colspan,
                        active: false,
                    },
                );
            }
            if cell.colspan == 1 {
                record_width(&mut widths, column, cell.width, spec.prefers_percent);
            }
            column += cell.colspan;
            min_rowspan = Some(min_rowspan.map_or(cell.rowspan, |m| m.min(cell.rowspan)));
        }

        // spans reaching past the last declared cell
        for &(_, span) in &active[next_marker.min(active.len())..] {
            placed.push(PlacedCell {
                column,
                colspan: span,
                kind: CellKind::Continuation,
            });
            column += span;
        }

        columns = columns.max(column);
        let step = min_rowspan.unwrap_or(1);
        markers.retain(|_, m| {
            if m.active {
                m.remaining = m.remaining.saturating_sub(step);
            }
            m.remaining > 0
        });
        for marker in markers.values_mut() {
            marker.active = true;
        }
        rows.push(placed);
    }

    let sizes = column_sizes(spec, &mut widths, columns);
    let width = emu_to_twips(spec.width.max(0));
    TableLayout {
        rows,
        grid: distribute_twips(&sizes, width),
        width,
    }
}

/// Keep the first width declared for a column, unless a later one matches the
/// table's unit class and the earlier one does not.
fn record_width(
    widths: &mut BTreeMap<usize, ColumnWidth>,
    column: usize,
    width: Option<ColumnWidth>,
    prefers_percent: bool,
) {
    let Some(width) = width else {
        return;
    };
    match widths.get(&column) {
        None => {
            widths.insert(column, width);
        }
        Some(old) => {
            if width.is_percent() == prefers_percent && old.is_percent() != prefers_percent {
                widths.insert(column, width);
            }
        }
    }
}

/// Column sizes in EMU before rounding.
///
/// Undeclared columns first receive an equal share of 100%. With an explicit
/// absolute table width, absolute columns take their size and percentages
/// split what is left in proportion to each other. Only when nothing else can
/// absorb the difference are the absolute columns scaled to fit. Otherwise absolute columns are turned into a percentage of the
/// table width and every column gets its percentage of the grand total.
fn column_sizes(
    spec: &TableSpec,
    widths: &mut BTreeMap<usize, ColumnWidth>,
    columns: usize,
) -> Vec<f64> {
    if columns == 0 {
        return Vec::new();
    }
    let share = 100.0 / columns as f64;
    for column in 0..columns {
        widths
            .entry(column)
            .or_insert(ColumnWidth::Percent(share));
    }
    let total = spec.width.max(0) as f64;
    let entries: Vec<ColumnWidth> = (0..columns).map(|c| widths[&c]).collect();

    let sizes: Vec<f64> = if spec.explicit {
        let absolute: f64 = entries
            .iter()
            .map(|w| match w {
                ColumnWidth::Absolute(emu) => (*emu).max(0) as f64,
                ColumnWidth::Percent(_) => 0.0,
            })
            .sum();
        let percent: f64 = entries
            .iter()
            .map(|w| match w {
                ColumnWidth::Percent(p) => p.max(0.0),
                ColumnWidth::Absolute(_) => 0.0,
            })
            .sum();
        // absolute columns keep their size while percentages can absorb the rest
        if percent > 0.0 && absolute <= total {
            let remaining = total - absolute;
            return entries
                .iter()
                .map(|w| match w {
                    ColumnWidth::Absolute(emu) => (*emu).max(0) as f64,
                    ColumnWidth::Percent(p) => remaining * p.max(0.0) / percent,
                })
                .collect();
        }
        entries
            .iter()
            .map(|w| match w {
                ColumnWidth::Absolute(emu) => *emu as f64,
                ColumnWidth::Percent(_) => 0.0,
            })
            .collect()
    } else {
        let percents: Vec<f64> = entries
            .iter()
            .map(|w| match w {
                ColumnWidth::Absolute(emu) if total > 0.0 => *emu as f64 * 100.0 / total,
                ColumnWidth::Absolute(_) => share,
                ColumnWidth::Percent(p) => *p,
            })
            .collect();
        let grand: f64 = percents.iter().sum();
        percents
            .iter()
            .map(|p| if grand > 0.0 { total * p / grand } else { 0.0 })
            .collect()
    };

    let sum: f64 = sizes.iter().map(|s| s.max(0.0)).sum();
    if sum <= 0.0 {
        return vec![total / columns as f64; columns];
    }
    sizes.iter().map(|s| s.max(0.0) * total / sum).collect()
}

/// Round sizes to whole twips so that they add up to exactly `total`.
fn distribute_twips(sizes: &[f64], total: i64) -> Vec<i64> {
    let sum: f64 = sizes.iter().sum();
    if sizes.is_empty() || sum <= 0.0 {
        return vec![0; sizes.len()];
    }
    let mut out = Vec::with_capacity(sizes.len());
    let mut acc = 0.0;
    let mut previous = 0;
    for size in sizes {
        acc += size;
        let edge = (acc * total as f64 / sum).round() as i64;
        out.push(edge - previous);
        previous = edge;
    }
    if let Some(last) = out.last_mut() {
        *last += total - previous;
    }
    out
}

fn section_is_header(name: &str) -> bool {
    name == "thead"
}

/// Rows of `table` in document order, looking through section wrappers.
fn table_rows(table: &Element) -> Vec<(&Element, bool)> {
    let mut rows = Vec::new();
    for child in table.child_elements() {
        match child.name.as_str() {
            "tr" => rows.push((child, false)),
            "thead" | "tbody" | "tfoot" => {
                let header = section_is_header(&child.name);
                rows.extend(
                    child
                        .child_elements()
                        .filter(|r| r.name == "tr")
                        .map(|r| (r, header)),
                );
            }
            _ => {}
        }
    }
    rows
}

fn row_cells(row: &Element) -> impl Iterator<Item = &Element> {
    row.child_elements()
        .filter(|c| c.name == "td" || c.name == "th")
}

/// Stamp output coordinates onto the source cells, in the same order
/// `table_rows`/`row_cells` visit them.
fn stamp_cells(table: &mut Element, stamps: &[(usize, usize)]) {
    let mut next = 0;
    let mut stamp_row = |row: &mut Element| {
        for cell in row
            .child_elements_mut()
            .filter(|c| c.name == "td" || c.name == "th")
        {
            match stamps.get(next).filter(|(r, _)| *r != usize::MAX) {
                Some((r, c)) => cell.set_attr(CELL_ATTR, &format!("{r},{c}")),
                None => {
                    cell.remove_attr(CELL_ATTR);
                }
            }
            next += 1;
        }
    };
    for child in table.child_elements_mut() {
        match child.name.as_str() {
            "tr" => stamp_row(child),
            "thead" | "tbody" | "tfoot" => {
                for row in child.child_elements_mut().filter(|r| r.name == "tr") {
                    stamp_row(row);
                }
            }
            _ => {}
        }
    }
}

fn span_attribute(el: &Element, name: &str) -> usize {
    el.attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(1)
}

fn declared_width(el: &Element, decl: &Declaration) -> Option<Length> {
    decl.get("width")
        .and_then(Length::parse)
        .or_else(|| el.attr("width").and_then(Length::parse_attribute))
}

fn vertical_alignment(value: &str) -> Option<CellVAlign> {
    match value.trim().to_ascii_lowercase().as_str() {
        "top" => Some(CellVAlign::Top),
        "middle" | "center" => Some(CellVAlign::Center),
        "bottom" => Some(CellVAlign::Bottom),
        _ => None,
    }
}

fn grid_borders(border: Border) -> TableBorders {
    TableBorders {
        outer: Borders::all(border),
        inside_h: Some(border),
        inside_v: Some(border),
    }
}

pub struct TablePolicy;

impl TablePolicy {
    fn borders(
        &self,
        el: &Element,
        own: &Declaration,
        container: ContainerId,
        ctx: &RenderContext,
    ) -> TableBorders {
        if let Some(px) = el.attr("border").and_then(|b| b.trim().parse::<f64>().ok()) {
            if px <= 0.0 {
                return TableBorders::default();
            }
            return grid_borders(Border {
                size: emu_to_eighth_points((px * EMU_PER_PX as f64).round() as i64),
                ..Border::single()
            });
        }
        let css = ctx.declared_borders(own);
        if !css.is_empty() {
            return TableBorders {
                outer: css,
                inside_h: None,
                inside_v: None,
            };
        }
        let nested = matches!(container, ContainerId::Cell { .. });
        if !nested || ctx.config().table_in_cell_border {
            grid_borders(Border::single())
        } else {
            TableBorders::default()
        }
    }

    fn alignment(&self, el: &Element, own: &Declaration) -> Option<Alignment> {
        let auto = |side: &str| own.get(&format!("margin-{side}")) == Some("auto");
        if auto("left") && auto("right") {
            return Some(Alignment::Center);
        }
        if el.attr("align").is_some_and(|a| a.eq_ignore_ascii_case("center")) {
            return Some(Alignment::Center);
        }
        match own.get("float").map(str::to_ascii_lowercase).as_deref() {
            Some("right") => Some(Alignment::Right),
            Some("left") => Some(Alignment::Left),
            _ => None,
        }
    }
}

impl TagPolicy for TablePolicy {
    fn tags(&self) -> &[&str] {
        &["table"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let container = ctx.current_container();
        let available = ctx.available_width_emu(container)?;
        let own = ctx.top_declaration().cloned().unwrap_or_default();
        let declared = declared_width(el, &own);
        let max = own.get("max-width").and_then(Length::parse);
        let resolvable = declared.filter(|l| l.is_percent() || ctx.length_to_emu(*l).is_some());
        let width = ctx.compute_length_in_emu(resolvable, max, available, Some(available));

        let rows = table_rows(el);
        let mut row_decls = Vec::with_capacity(rows.len());
        let mut cell_sources = Vec::new();
        let mut spec_rows = Vec::with_capacity(rows.len());
        for (row, header) in &rows {
            let row_decl = element_declaration(row);
            let mut spec_row = Vec::new();
            for cell in row_cells(row) {
                let decl = element_declaration(cell);
                let mut spec = CellSpec::new(span_attribute(cell, "rowspan"), span_attribute(cell, "colspan"));
                if let Some(w) = declared_width(cell, &decl) {
                    if w.is_percent() {
                        spec = spec.with_width(ColumnWidth::Percent(w.value));
                    } else if let Some(emu) = ctx.length_to_emu(w) {
                        spec = spec.with_width(ColumnWidth::Absolute(emu));
                    }
                }
                spec_row.push(spec);
                cell_sources.push(decl);
            }
            row_decls.push((row_decl, *header));
            spec_rows.push(spec_row);
        }
        if spec_rows.iter().all(|r| r.is_empty()) {
            log::debug!("Skipping table without cells");
            return Ok(Flow::Skip);
        }

        let spec = TableSpec {
            rows: spec_rows,
            width,
            explicit: resolvable.is_some_and(|l| !l.is_percent()),
            prefers_percent: resolvable.is_none_or(|l| l.is_percent()),
        };
        let layout = layout_table(&spec);
        log::debug!(
            "Table layout: {} rows, grid {:?} twips",
            layout.rows.len(),
            layout.grid
        );

        let mut table = Table {
            grid: layout.grid.clone(),
            props: TableProperties {
                width: layout.width,
                borders: self.borders(el, &own, container, ctx),
                alignment: self.alignment(el, &own),
            },
            rows: Vec::with_capacity(layout.rows.len()),
        };
        let mut stamps = vec![(usize::MAX, 0); cell_sources.len()];
        for (ri, placed) in layout.rows.iter().enumerate() {
            if placed.is_empty() {
                continue;
            }
            let out_row = table.rows.len();
            let (row_decl, header) = &row_decls[ri];
            let height = row_decl
                .get("height")
                .and_then(Length::parse)
                .or_else(|| rows[ri].0.attr("height").and_then(Length::parse_attribute))
                .and_then(|l| ctx.length_to_emu(l))
                .map(emu_to_twips);
            let mut cells = Vec::with_capacity(placed.len());
            for (ci, cell) in placed.iter().enumerate() {
                let mut props = CellProperties {
                    width: layout.cell_width(cell),
                    grid_span: cell.colspan.min(u16::MAX as usize) as u16,
                    ..CellProperties::default()
                };
                match cell.kind {
                    CellKind::Real { source, rowspan } => {
                        stamps[source] = (out_row, ci);
                        let decl = &cell_sources[source];
                        props.v_merge = if rowspan > 1 { VMerge::Restart } else { VMerge::None };
                        props.borders = ctx.declared_borders(decl);
                        props.shading = decl
                            .get("background-color")
                            .or_else(|| row_decl.get("background-color"))
                            .and_then(color_value);
                        props.v_align = decl
                            .get("vertical-align")
                            .or_else(|| row_decl.get("vertical-align"))
                            .and_then(vertical_alignment);
                    }
                    CellKind::Continuation => props.v_merge = VMerge::Continue,
                }
                cells.push(TableCell {
                    props,
                    blocks: Vec::new(),
                });
            }
            table.rows.push(TableRow {
                cells,
                height,
                header: *header,
            });
        }

        if let Some(p) = ctx.current_paragraph() {
            ctx.discard_if_empty(p)?;
        }
        let after = ctx.current_block();
        let id = ctx
            .document_mut()
            .insert_table_after(container, after, table)?;
        ctx.document_mut().fill_empty_cells(id);
        stamp_cells(el, &stamps);

        ctx.close_paragraph();
        ctx.push_table(TableFrame { id, container });
        Ok(Flow::Descend)
    }

    fn end(&self, _el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        let frame = ctx.pop_table().ok_or(Error::NoEnclosingTable)?;
        ctx.replace_closest_block(BlockRef::Table(frame.id));
        ctx.close_paragraph();
        Ok(())
    }
}

/// `td`/`th`: route content into the output cell stamped during layout.
pub struct CellPolicy;

impl TagPolicy for CellPolicy {
    fn tags(&self) -> &[&str] {
        &["td", "th"]
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error> {
        let table = ctx.current_table()?;
        let Some((row, cell)) = el.attr(CELL_ATTR).and_then(|s| {
            let (r, c) = s.split_once(',')?;
            Some((r.parse::<usize>().ok()?, c.parse::<usize>().ok()?))
        }) else {
            log::warn!("Skipping <{}> that is not part of a table row", el.name);
            return Ok(Flow::Skip);
        };
        let container = ContainerId::Cell {
            table: table.id,
            row,
            cell,
        };
        let first = ctx.document().blocks(container)?.first().copied();
        ctx.push_container(container);
        ctx.push_closest_block(first);
        if el.name == "th" {
            push_synthetic_style(
                ctx,
                &Declaration::from_pairs(&[("font-weight", "bold"), ("text-align", "center")]),
            );
        }
        if let Some(BlockRef::Paragraph(p)) = first {
            ctx.open_paragraph(p);
            ctx.apply_paragraph_format(p)?;
        }
        Ok(Flow::Descend)
    }

    fn end(&self, el: &Element, ctx: &mut RenderContext) -> Result<(), Error> {
        let container = ctx.current_container();
        // a cell must end with a paragraph, even after a nested table
        ctx.document_mut().ensure_trailing_paragraph(container)?;
        if el.name == "th" {
            ctx.pop_inline_style();
        }
        ctx.pop_closest_block();
        ctx.pop_container();
        Ok(())
    }
}
