//! In-memory WordprocessingML document the renderer writes into.
//!
//! Paragraphs and tables live in arenas owned by [`Document`]; the body and
//! every table cell hold ordered [`BlockRef`] lists into those arenas. This
//! keeps ids stable while blocks are spliced in relative to an insertion
//! point, and lets the renderer keep plain `Copy` handles on its stacks.

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParagraphId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockRef {
    Paragraph(ParagraphId),
    Table(TableId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerId {
    Body,
    Cell { table: TableId, row: usize, cell: usize },
}

/// Address of a run: a paragraph child slot, and for runs inside a hyperlink
/// the index within the hyperlink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunRef {
    pub paragraph: ParagraphId,
    pub slot: usize,
    pub link_slot: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum VertAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnderlineStyle {
    Single,
    Double,
    Dotted,
    Dash,
    Wave,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BorderStyle {
    Single,
    Dotted,
    Dashed,
    Double,
    ThreeDEngrave,
    ThreeDEmboss,
    Inset,
    Outset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Border {
    pub style: BorderStyle,
    /// Eighths of a point.
    pub size: u32,
    pub color: Option<[u8; 3]>,
}

impl Border {
    pub fn single() -> Self {
        Self {
            style: BorderStyle::Single,
            size: 4,
            color: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Borders {
    pub top: Option<Border>,
    pub right: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }

    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border),
            right: Some(border),
            bottom: Some(border),
            left: Some(border),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TableBorders {
    pub outer: Borders,
    pub inside_h: Option<Border>,
    pub inside_v: Option<Border>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineSpacing {
    /// 240ths of a line.
    Auto(u32),
    /// Twips.
    Exact(i64),
    /// Twips.
    AtLeast(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u8,
}

/// Paragraph geometry is in twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphProperties {
    pub alignment: Option<Alignment>,
    pub indent_left: i64,
    pub indent_right: i64,
    /// Positive: first-line indent. Negative: hanging indent.
    pub indent_first_line: i64,
    pub space_before: Option<i64>,
    pub space_after: Option<i64>,
    pub line_spacing: Option<LineSpacing>,
    pub shading: Option<[u8; 3]>,
    pub borders: Borders,
    pub page_break_before: bool,
    pub keep_next: bool,
    pub outline_level: Option<u8>,
    pub numbering: Option<NumberingRef>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProperties {
    pub font: Option<String>,
    /// Half points.
    pub size: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<UnderlineStyle>,
    pub underline_color: Option<[u8; 3]>,
    pub strike: bool,
    pub color: Option<[u8; 3]>,
    pub shading: Option<[u8; 3]>,
    pub vert_align: VertAlign,
    pub small_caps: bool,
    pub caps: bool,
    pub vanish: bool,
    /// Twips.
    pub spacing: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldCharType {
    Begin,
    Separate,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaId(usize);

impl MediaId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drawing {
    pub id: u32,
    pub media: MediaId,
    pub name: String,
    pub width_emu: i64,
    pub height_emu: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    Text { text: String, preserve_space: bool },
    Break,
    Tab,
    Drawing(Drawing),
    FieldChar(FieldCharType),
    InstrText(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub props: RunProperties,
    pub content: Vec<RunContent>,
}

impl Run {
    pub fn text(&self) -> String {
        let mut out = String::new();
        for c in &self.content {
            match c {
                RunContent::Text { text, .. } => out.push_str(text),
                RunContent::Break => out.push('\n'),
                RunContent::Tab => out.push('\t'),
                _ => {}
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HyperlinkTarget {
    External(String),
    Anchor(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hyperlink {
    pub target: HyperlinkTarget,
    pub runs: Vec<Run>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Run(Run),
    Hyperlink(Hyperlink),
    /// Ready-to-insert OMML produced by the math collaborator.
    Math(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub props: ParagraphProperties,
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Inline::Run(run) => out.push_str(&run.text()),
                Inline::Hyperlink(link) => link.runs.iter().for_each(|r| out.push_str(&r.text())),
                Inline::Math(_) => {}
            }
        }
        out
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().flat_map(|child| {
            let runs: Box<dyn Iterator<Item = &Run>> = match child {
                Inline::Run(run) => Box::new(std::iter::once(run)),
                Inline::Hyperlink(link) => Box::new(link.runs.iter()),
                Inline::Math(_) => Box::new(std::iter::empty()),
            };
            runs
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum VMerge {
    #[default]
    None,
    Restart,
    Continue,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellVAlign {
    Top,
    Center,
    Bottom,
}

/// Default left/right cell margin Word applies, in twips.
pub const DEFAULT_CELL_MARGIN: i64 = 108;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellProperties {
    /// Twips.
    pub width: i64,
    pub grid_span: u16,
    pub v_merge: VMerge,
    pub borders: Borders,
    pub shading: Option<[u8; 3]>,
    pub v_align: Option<CellVAlign>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub props: CellProperties,
    pub blocks: Vec<BlockRef>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Twips, "at least".
    pub height: Option<i64>,
    pub header: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableProperties {
    /// Twips.
    pub width: i64,
    pub borders: TableBorders,
    pub alignment: Option<Alignment>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Column widths in twips.
    pub grid: Vec<i64>,
    pub props: TableProperties,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    Decimal,
    DecimalZero,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Bullet,
    None,
}

impl NumberFormat {
    pub fn wml_name(self) -> &'static str {
        match self {
            NumberFormat::Decimal => "decimal",
            NumberFormat::DecimalZero => "decimalZero",
            NumberFormat::LowerLetter => "lowerLetter",
            NumberFormat::UpperLetter => "upperLetter",
            NumberFormat::LowerRoman => "lowerRoman",
            NumberFormat::UpperRoman => "upperRoman",
            NumberFormat::Bullet => "bullet",
            NumberFormat::None => "none",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LevelSuffix {
    #[default]
    Tab,
    Space,
    Nothing,
}

impl LevelSuffix {
    pub fn wml_name(self) -> &'static str {
        match self {
            LevelSuffix::Tab => "tab",
            LevelSuffix::Space => "space",
            LevelSuffix::Nothing => "nothing",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberingLevel {
    pub format: NumberFormat,
    pub text: String,
    pub start: u32,
    /// Twips.
    pub indent_left: i64,
    pub indent_right: i64,
    pub hanging: i64,
    pub suffix: LevelSuffix,
    pub font: Option<String>,
}

/// Reusable level formats, shared by every list with the same signature.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberingDefinition {
    pub abstract_id: u32,
    pub signature: String,
    pub levels: Vec<NumberingLevel>,
}

/// One concrete list bound to a definition. Each instance counts from its
/// own start values.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub abstract_id: u32,
    /// Start value per level, written as overrides so the list restarts.
    pub start_overrides: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Media {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub name: String,
}

/// Page size and margins in twips.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
    pub margin_top: i64,
    pub margin_right: i64,
    pub margin_bottom: i64,
    pub margin_left: i64,
}

impl PageGeometry {
    pub const LETTER: PageGeometry = PageGeometry {
        width: 12240,
        height: 15840,
        margin_top: 1440,
        margin_right: 1440,
        margin_bottom: 1440,
        margin_left: 1440,
    };

    pub const A4: PageGeometry = PageGeometry {
        width: 11906,
        height: 16838,
        margin_top: 1440,
        margin_right: 1800,
        margin_bottom: 1440,
        margin_left: 1800,
    };

    pub fn content_width(&self) -> i64 {
        (self.width - self.margin_left - self.margin_right).max(0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::LETTER
    }
}

pub struct Document {
    pub page: PageGeometry,
    /// Half points.
    pub default_font_size: u32,
    pub default_font: Option<String>,
    body: Vec<BlockRef>,
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
    numbering: Vec<NumberingDefinition>,
    numbering_instances: Vec<NumberingInstance>,
    media: Vec<Media>,
    next_drawing_id: u32,
}

impl Default for Document {
    fn default() -> Self {
        Document::new(PageGeometry::default())
    }
}

impl Document {
    pub fn new(page: PageGeometry) -> Self {
        Self {
            page,
            default_font_size: 22,
            default_font: None,
            body: Vec::new(),
            paragraphs: Vec::new(),
            tables: Vec::new(),
            numbering: Vec::new(),
            numbering_instances: Vec::new(),
            media: Vec::new(),
            next_drawing_id: 1,
        }
    }

    pub fn body(&self) -> &[BlockRef] {
        &self.body
    }

    pub fn paragraph(&self, id: ParagraphId) -> &Paragraph {
        &self.paragraphs[id.0]
    }

    pub fn paragraph_mut(&mut self, id: ParagraphId) -> &mut Paragraph {
        &mut self.paragraphs[id.0]
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub fn table_mut(&mut self, id: TableId) -> &mut Table {
        &mut self.tables[id.0]
    }

    pub fn cell(&self, table: TableId, row: usize, cell: usize) -> Option<&TableCell> {
        self.tables.get(table.0)?.rows.get(row)?.cells.get(cell)
    }

    pub fn blocks(&self, container: ContainerId) -> Result<&[BlockRef], Error> {
        match container {
            ContainerId::Body => Ok(&self.body),
            ContainerId::Cell { table, row, cell } => self
                .cell(table, row, cell)
                .map(|c| c.blocks.as_slice())
                .ok_or_else(|| stale_container(container)),
        }
    }

    fn blocks_mut(&mut self, container: ContainerId) -> Result<&mut Vec<BlockRef>, Error> {
        match container {
            ContainerId::Body => Ok(&mut self.body),
            ContainerId::Cell { table, row, cell } => self
                .tables
                .get_mut(table.0)
                .and_then(|t| t.rows.get_mut(row))
                .and_then(|r| r.cells.get_mut(cell))
                .map(|c| &mut c.blocks)
                .ok_or_else(|| stale_container(container)),
        }
    }

    /// Width available to content placed directly in `container`, in twips.
    pub fn available_width(&self, container: ContainerId) -> Result<i64, Error> {
        match container {
            ContainerId::Body => Ok(self.page.content_width()),
            ContainerId::Cell { table, row, cell } => self
                .cell(table, row, cell)
                .map(|c| (c.props.width - 2 * DEFAULT_CELL_MARGIN).max(0))
                .ok_or_else(|| stale_container(container)),
        }
    }

    pub fn add_paragraph(&mut self, container: ContainerId) -> Result<ParagraphId, Error> {
        let id = ParagraphId(self.paragraphs.len());
        self.blocks_mut(container)?.push(BlockRef::Paragraph(id));
        self.paragraphs.push(Paragraph::default());
        Ok(id)
    }

    /// Insert a new paragraph right after `after` in `container`, or at the end
    /// when `after` is `None` or not part of the container.
    pub fn insert_paragraph_after(
        &mut self,
        container: ContainerId,
        after: Option<BlockRef>,
    ) -> Result<ParagraphId, Error> {
        let id = ParagraphId(self.paragraphs.len());
        insert_after(self.blocks_mut(container)?, after, BlockRef::Paragraph(id));
        self.paragraphs.push(Paragraph::default());
        Ok(id)
    }

    pub fn insert_table_after(
        &mut self,
        container: ContainerId,
        after: Option<BlockRef>,
        table: Table,
    ) -> Result<TableId, Error> {
        let id = TableId(self.tables.len());
        insert_after(self.blocks_mut(container)?, after, BlockRef::Table(id));
        self.tables.push(table);
        Ok(id)
    }

    /// Add an empty paragraph to every cell of `table` that has no block yet.
    pub fn fill_empty_cells(&mut self, table: TableId) {
        let mut missing = Vec::new();
        for (ri, row) in self.tables[table.0].rows.iter().enumerate() {
            for (ci, cell) in row.cells.iter().enumerate() {
                if cell.blocks.is_empty() {
                    missing.push((ri, ci));
                }
            }
        }
        for (ri, ci) in missing {
            let id = ParagraphId(self.paragraphs.len());
            self.paragraphs.push(Paragraph::default());
            self.tables[table.0].rows[ri].cells[ci]
                .blocks
                .push(BlockRef::Paragraph(id));
        }
    }

    /// Detach `block` from `container`. The arena slot stays allocated but is
    /// no longer reachable from the tree.
    pub fn remove_block(&mut self, container: ContainerId, block: BlockRef) -> Result<bool, Error> {
        let blocks = self.blocks_mut(container)?;
        match blocks.iter().position(|b| *b == block) {
            Some(pos) => {
                blocks.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Make sure `container` ends with a paragraph; Word requires this for
    /// cells and it keeps the body editable after a trailing table.
    pub fn ensure_trailing_paragraph(
        &mut self,
        container: ContainerId,
    ) -> Result<Option<ParagraphId>, Error> {
        match self.blocks(container)?.last() {
            Some(BlockRef::Paragraph(_)) => Ok(None),
            _ => self.add_paragraph(container).map(Some),
        }
    }

    pub fn insert_run(&mut self, paragraph: ParagraphId, slot: usize, run: Run) -> RunRef {
        let children = &mut self.paragraphs[paragraph.0].children;
        let slot = slot.min(children.len());
        children.insert(slot, Inline::Run(run));
        RunRef {
            paragraph,
            slot,
            link_slot: None,
        }
    }

    pub fn insert_hyperlink(
        &mut self,
        paragraph: ParagraphId,
        slot: usize,
        target: HyperlinkTarget,
    ) -> usize {
        let children = &mut self.paragraphs[paragraph.0].children;
        let slot = slot.min(children.len());
        children.insert(
            slot,
            Inline::Hyperlink(Hyperlink {
                target,
                runs: Vec::new(),
            }),
        );
        slot
    }

    /// Append a run to the hyperlink at `slot`. Returns `None` if the slot does
    /// not hold a hyperlink.
    pub fn push_hyperlink_run(
        &mut self,
        paragraph: ParagraphId,
        slot: usize,
        run: Run,
    ) -> Option<RunRef> {
        match self.paragraphs[paragraph.0].children.get_mut(slot)? {
            Inline::Hyperlink(link) => {
                link.runs.push(run);
                Some(RunRef {
                    paragraph,
                    slot,
                    link_slot: Some(link.runs.len() - 1),
                })
            }
            _ => None,
        }
    }

    pub fn insert_math(&mut self, paragraph: ParagraphId, slot: usize, omml: String) -> usize {
        let children = &mut self.paragraphs[paragraph.0].children;
        let slot = slot.min(children.len());
        children.insert(slot, Inline::Math(omml));
        slot
    }

    pub fn run(&self, at: RunRef) -> Option<&Run> {
        match (self.paragraphs.get(at.paragraph.0)?.children.get(at.slot)?, at.link_slot) {
            (Inline::Run(run), None) => Some(run),
            (Inline::Hyperlink(link), Some(i)) => link.runs.get(i),
            _ => None,
        }
    }

    pub fn run_mut(&mut self, at: RunRef) -> Option<&mut Run> {
        match (
            self.paragraphs.get_mut(at.paragraph.0)?.children.get_mut(at.slot)?,
            at.link_slot,
        ) {
            (Inline::Run(run), None) => Some(run),
            (Inline::Hyperlink(link), Some(i)) => link.runs.get_mut(i),
            _ => None,
        }
    }

    /// Remove a run from its paragraph (or hyperlink) and hand it back. Slots
    /// after it shift down by one.
    pub fn remove_run(&mut self, at: RunRef) -> Option<Run> {
        let children = &mut self.paragraphs.get_mut(at.paragraph.0)?.children;
        match at.link_slot {
            None => match children.get(at.slot)? {
                Inline::Run(_) => match children.remove(at.slot) {
                    Inline::Run(run) => Some(run),
                    _ => None,
                },
                _ => None,
            },
            Some(i) => match children.get_mut(at.slot)? {
                Inline::Hyperlink(link) if i < link.runs.len() => Some(link.runs.remove(i)),
                _ => None,
            },
        }
    }

    /// Store picture bytes and append a drawing of the given extent to `run`.
    pub fn add_picture(
        &mut self,
        run: RunRef,
        data: Vec<u8>,
        format: ImageFormat,
        name: &str,
        width_emu: i64,
        height_emu: i64,
    ) -> Result<u32, Error> {
        if width_emu <= 0 || height_emu <= 0 {
            return Err(Error::Image(format!(
                "picture {name:?} has a degenerate extent {width_emu}x{height_emu}"
            )));
        }
        if self.run(run).is_none() {
            return Err(Error::InvalidStructure(format!("no run at {run:?}")));
        }
        let media = MediaId(self.media.len());
        self.media.push(Media {
            data,
            format,
            name: name.to_string(),
        });
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        let drawing = Drawing {
            id,
            media,
            name: name.to_string(),
            width_emu,
            height_emu,
        };
        if let Some(r) = self.run_mut(run) {
            r.content.push(RunContent::Drawing(drawing));
        }
        Ok(id)
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    pub fn numbering(&self) -> &[NumberingDefinition] {
        &self.numbering
    }

    pub fn numbering_instances(&self) -> &[NumberingInstance] {
        &self.numbering_instances
    }

    /// Abstract id of the definition with `signature`.
    pub fn find_numbering(&self, signature: &str) -> Option<u32> {
        self.numbering
            .iter()
            .find(|n| n.signature == signature)
            .map(|n| n.abstract_id)
    }

    /// Store a definition and return its abstract id.
    pub fn add_numbering(&mut self, signature: String, levels: Vec<NumberingLevel>) -> u32 {
        let abstract_id = self.numbering.len() as u32;
        self.numbering.push(NumberingDefinition {
            abstract_id,
            signature,
            levels,
        });
        abstract_id
    }

    /// Bind a new list to the definition `abstract_id` and return the
    /// instance's `num_id`.
    pub fn add_numbering_instance(&mut self, abstract_id: u32) -> Result<u32, Error> {
        let definition = self.numbering.get(abstract_id as usize).ok_or_else(|| {
            Error::InvalidStructure(format!("no numbering definition {abstract_id}"))
        })?;
        let start_overrides = definition.levels.iter().map(|l| l.start).collect();
        let num_id = self.numbering_instances.len() as u32 + 1;
        self.numbering_instances.push(NumberingInstance {
            num_id,
            abstract_id,
            start_overrides,
        });
        Ok(num_id)
    }

    /// The definition a paragraph's `num_id` resolves to.
    pub fn numbering_definition(&self, num_id: u32) -> Option<&NumberingDefinition> {
        let instance = self.numbering_instances.iter().find(|i| i.num_id == num_id)?;
        self.numbering.get(instance.abstract_id as usize)
    }

    /// Every paragraph reachable from the body, in document order, descending
    /// into table cells.
    pub fn paragraphs_in_order(&self) -> Vec<ParagraphId> {
        let mut out = Vec::new();
        self.collect_paragraphs(&self.body, &mut out);
        out
    }

    fn collect_paragraphs(&self, blocks: &[BlockRef], out: &mut Vec<ParagraphId>) {
        for block in blocks {
            match block {
                BlockRef::Paragraph(id) => out.push(*id),
                BlockRef::Table(id) => {
                    for row in &self.tables[id.0].rows {
                        for cell in &row.cells {
                            self.collect_paragraphs(&cell.blocks, out);
                        }
                    }
                }
            }
        }
    }
}

fn insert_after(blocks: &mut Vec<BlockRef>, after: Option<BlockRef>, block: BlockRef) {
    let pos = after
        .and_then(|a| blocks.iter().position(|b| *b == a))
        .map(|p| p + 1)
        .unwrap_or(blocks.len());
    blocks.insert(pos, block);
}

fn stale_container(container: ContainerId) -> Error {
    Error::UnsupportedContainer(format!("{container:?} does not exist in this document"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_inserted_after_the_cursor() {
        let mut doc = Document::default();
        let a = doc.add_paragraph(ContainerId::Body).unwrap();
        let c = doc.add_paragraph(ContainerId::Body).unwrap();
        let b = doc
            .insert_paragraph_after(ContainerId::Body, Some(BlockRef::Paragraph(a)))
            .unwrap();
        assert_eq!(
            doc.body(),
            &[
                BlockRef::Paragraph(a),
                BlockRef::Paragraph(b),
                BlockRef::Paragraph(c)
            ]
        );
    }

    #[test]
    fn runs_can_be_removed_from_paragraphs_and_hyperlinks() {
        let mut doc = Document::default();
        let p = doc.add_paragraph(ContainerId::Body).unwrap();
        let first = doc.insert_run(p, 0, Run::default());
        let slot = doc.insert_hyperlink(p, 1, HyperlinkTarget::Anchor("top".into()));
        let linked = doc.push_hyperlink_run(p, slot, Run::default()).unwrap();
        assert!(doc.remove_run(linked).is_some());
        assert!(doc.remove_run(first).is_some());
        assert_eq!(doc.paragraph(p).children.len(), 1);
        assert!(doc.remove_run(first).is_none());
    }

    #[test]
    fn stale_cell_container_is_an_error() {
        let doc = Document::default();
        let bogus = ContainerId::Cell {
            table: TableId(3),
            row: 0,
            cell: 0,
        };
        assert!(matches!(
            doc.available_width(bogus),
            Err(Error::UnsupportedContainer(_))
        ));
    }

    #[test]
    fn trailing_paragraph_follows_a_table() {
        let mut doc = Document::default();
        let t = doc
            .insert_table_after(ContainerId::Body, None, Table::default())
            .unwrap();
        let added = doc.ensure_trailing_paragraph(ContainerId::Body).unwrap();
        assert!(added.is_some());
        assert_eq!(doc.body()[0], BlockRef::Table(t));
        assert!(doc.ensure_trailing_paragraph(ContainerId::Body).unwrap().is_none());
    }
}
