use crate::config::RenderConfig;
use crate::css::{Declaration, FONT_SIZE_KEYWORDS, FONT_SIZE_STEPS};
use crate::error::Error;
use crate::model::{
    BlockRef, ContainerId, Document, HyperlinkTarget, ImageFormat, ParagraphId, Run, RunContent,
    RunRef, TableId,
};
use crate::numbering::NumberingContext;
use crate::resources::{ImageLoader, MathConverter};
use crate::tags::TagRegistry;
use crate::units::{Length, LengthUnit, emu_to_half_points, half_points_to_emu, twips_to_emu};

use super::text::{Piece, WhiteSpace, WhitespaceState, needs_preserve, segment};

/// One element's contribution to the cascade.
#[derive(Clone, Debug)]
pub struct StyleFrame {
    pub decl: Declaration,
    pub is_block: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableFrame {
    pub id: TableId,
    /// Container the table was inserted into.
    pub container: ContainerId,
}

#[derive(Clone, Debug)]
struct LinkFrame {
    target: HyperlinkTarget,
    /// Paragraph and slot of the hyperlink node, created with the first run.
    at: Option<(ParagraphId, usize)>,
}

#[derive(Clone, Copy, Debug, Default)]
struct ParagraphState {
    /// Paragraph accepting inline content. `None` once a block has closed it.
    open: Option<ParagraphId>,
    whitespace: WhitespaceState,
}

#[derive(Clone, Copy, Debug)]
struct ContainerFrame {
    id: ContainerId,
    /// Style stack depth when the container was entered; paragraph geometry
    /// only accumulates over frames above it.
    style_base: usize,
    saved: ParagraphState,
}

/// Stack depths captured before an element is visited, so every push made
/// while visiting it can be undone on any exit path.
#[derive(Clone, Copy, Debug)]
pub struct StackMark {
    styles: usize,
    containers: usize,
    closest_blocks: usize,
    tables: usize,
    links: usize,
    dedupe: usize,
    block_depth: usize,
}

/// Read-only collaborators shared by every render.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub registry: &'a TagRegistry,
    pub images: &'a dyn ImageLoader,
    pub math: Option<&'a dyn MathConverter>,
}

/// Mutable state for rendering one HTML fragment into one container.
pub struct RenderContext<'a> {
    doc: &'a mut Document,
    config: &'a RenderConfig,
    collaborators: Collaborators<'a>,
    root: ContainerId,
    styles: Vec<StyleFrame>,
    /// Resolved font size in half points, parallel to `styles`.
    font_sizes: Vec<u32>,
    containers: Vec<ContainerFrame>,
    /// Last block written in each container; new blocks go right after it.
    closest_blocks: Vec<Option<BlockRef>>,
    tables: Vec<TableFrame>,
    links: Vec<LinkFrame>,
    dedupe: Vec<ParagraphId>,
    paragraph: ParagraphState,
    block_depth: usize,
    numbering: NumberingContext,
}

impl<'a> RenderContext<'a> {
    /// Bind a context to `container`. Output goes after `anchor`, or at the
    /// end of the container when there is none.
    pub fn new(
        doc: &'a mut Document,
        config: &'a RenderConfig,
        collaborators: Collaborators<'a>,
        container: ContainerId,
        anchor: Option<BlockRef>,
    ) -> Self {
        let numbering = NumberingContext::new(config.numbering_indent, config.level_suffix);
        Self {
            doc,
            config,
            collaborators,
            root: container,
            styles: Vec::new(),
            font_sizes: Vec::new(),
            containers: Vec::new(),
            closest_blocks: vec![anchor],
            tables: Vec::new(),
            links: Vec::new(),
            dedupe: Vec::new(),
            paragraph: ParagraphState::default(),
            block_depth: 0,
            numbering,
        }
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.doc
    }

    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    pub fn registry(&self) -> &'a TagRegistry {
        self.collaborators.registry
    }

    pub fn images(&self) -> &'a dyn ImageLoader {
        self.collaborators.images
    }

    pub fn math(&self) -> Option<&'a dyn MathConverter> {
        self.collaborators.math
    }

    pub fn numbering(&mut self) -> &mut NumberingContext {
        &mut self.numbering
    }

    /// Close the innermost list level against the output document.
    pub fn end_list_level(&mut self) -> Result<Option<u32>, Error> {
        self.numbering.end_level(&mut *self.doc)
    }

    pub fn block_depth(&self) -> usize {
        self.block_depth
    }

    // -- stacks -----------------------------------------------------------

    pub fn mark(&self) -> StackMark {
        StackMark {
            styles: self.styles.len(),
            containers: self.containers.len(),
            closest_blocks: self.closest_blocks.len(),
            tables: self.tables.len(),
            links: self.links.len(),
            dedupe: self.dedupe.len(),
            block_depth: self.block_depth,
        }
    }

    /// Pop everything pushed since `mark`.
    pub fn restore(&mut self, mark: StackMark) {
        while self.containers.len() > mark.containers {
            self.pop_container();
        }
        self.styles.truncate(mark.styles);
        self.font_sizes.truncate(mark.styles);
        self.closest_blocks.truncate(mark.closest_blocks.max(1));
        self.tables.truncate(mark.tables);
        self.links.truncate(mark.links);
        self.dedupe.truncate(mark.dedupe);
        self.block_depth = mark.block_depth;
    }

    pub fn push_container(&mut self, id: ContainerId) {
        self.containers.push(ContainerFrame {
            id,
            style_base: self.styles.len(),
            saved: self.paragraph,
        });
        self.paragraph = ParagraphState::default();
    }

    pub fn pop_container(&mut self) -> Option<ContainerId> {
        let frame = self.containers.pop()?;
        self.paragraph = frame.saved;
        Some(frame.id)
    }

    pub fn current_container(&self) -> ContainerId {
        self.containers.last().map_or(self.root, |f| f.id)
    }

    pub fn push_closest_block(&mut self, block: Option<BlockRef>) {
        self.closest_blocks.push(block);
    }

    pub fn pop_closest_block(&mut self) -> Option<BlockRef> {
        if self.closest_blocks.len() > 1 {
            self.closest_blocks.pop().flatten()
        } else {
            None
        }
    }

    pub fn replace_closest_block(&mut self, block: BlockRef) {
        match self.closest_blocks.last_mut() {
            Some(top) => *top = Some(block),
            None => self.closest_blocks.push(Some(block)),
        }
    }

    pub fn current_block(&self) -> Option<BlockRef> {
        self.closest_blocks.last().copied().flatten()
    }

    pub fn push_inline_style(&mut self, decl: Declaration, is_block: bool) {
        let parent = self.font_size();
        let size = decl
            .get("font-size")
            .and_then(|v| self.resolve_font_size(v, parent))
            .unwrap_or(parent);
        self.font_sizes.push(size);
        self.styles.push(StyleFrame { decl, is_block });
    }

    pub fn pop_inline_style(&mut self) -> Option<StyleFrame> {
        self.font_sizes.pop();
        self.styles.pop()
    }

    pub fn top_declaration(&self) -> Option<&Declaration> {
        self.styles.last().map(|f| &f.decl)
    }

    /// Style frames pushed since the current container was entered, outermost
    /// first.
    pub fn container_frames(&self) -> &[StyleFrame] {
        let base = self.containers.last().map_or(0, |f| f.style_base);
        &self.styles[base.min(self.styles.len())..]
    }

    pub fn push_table(&mut self, frame: TableFrame) {
        self.tables.push(frame);
    }

    pub fn pop_table(&mut self) -> Option<TableFrame> {
        self.tables.pop()
    }

    pub fn current_table(&self) -> Result<TableFrame, Error> {
        self.tables.last().copied().ok_or(Error::NoEnclosingTable)
    }

    pub fn push_hyperlink(&mut self, target: HyperlinkTarget) {
        self.links.push(LinkFrame { target, at: None });
    }

    pub fn pop_hyperlink(&mut self) {
        self.links.pop();
    }

    pub fn push_dedupe(&mut self, paragraph: ParagraphId) {
        self.dedupe.push(paragraph);
    }

    pub fn pop_dedupe(&mut self) -> Option<ParagraphId> {
        self.dedupe.pop()
    }

    // -- cascade ----------------------------------------------------------

    /// Innermost non-blank value of `name`, or an empty string. With
    /// `inline_only` the scan stops before the first block frame.
    pub fn get_property_value(&self, name: &str, case_sensitive: bool, inline_only: bool) -> String {
        for frame in self.styles.iter().rev() {
            if inline_only && frame.is_block {
                break;
            }
            if let Some(value) = frame.decl.get(name) {
                return if case_sensitive {
                    value.to_string()
                } else {
                    value.to_ascii_lowercase()
                };
            }
        }
        String::new()
    }

    /// Every declared value of `name`, innermost first.
    pub fn property_values<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.styles.iter().rev().filter_map(move |f| f.decl.get(name))
    }

    /// Inherited font size in half points.
    pub fn font_size(&self) -> u32 {
        self.font_sizes
            .last()
            .copied()
            .unwrap_or(self.doc.default_font_size)
    }

    fn resolve_font_size(&self, value: &str, parent: u32) -> Option<u32> {
        let value = value.trim().to_ascii_lowercase();
        if let Some((_, px)) = FONT_SIZE_KEYWORDS.iter().find(|(k, _)| *k == value) {
            // px -> pt is 0.75, pt -> half points is 2
            return Some((px * 1.5).round() as u32);
        }
        match value.as_str() {
            "smaller" => {
                return Some(
                    FONT_SIZE_STEPS
                        .iter()
                        .rev()
                        .find(|&&s| s < parent)
                        .copied()
                        .unwrap_or(parent),
                );
            }
            "larger" => {
                return Some(
                    FONT_SIZE_STEPS
                        .iter()
                        .find(|&&s| s > parent)
                        .copied()
                        .unwrap_or(parent),
                );
            }
            _ => {}
        }
        let length = Length::parse(&value)?;
        let half_points = match length.unit {
            LengthUnit::Percent => parent as f64 * length.value / 100.0,
            LengthUnit::Em => parent as f64 * length.value,
            _ => return self.length_to_emu(length).map(emu_to_half_points),
        };
        Some((half_points.round() as u32).max(1))
    }

    // -- units ------------------------------------------------------------

    /// Resolve a length to EMU. Percentages need a reference size and are
    /// rejected here.
    pub fn length_to_emu(&self, length: Length) -> Option<i64> {
        let page = &self.doc.page;
        let viewport = |twips: i64| twips_to_emu(twips) as f64 * length.value / 100.0;
        let emu = match length.unit {
            LengthUnit::Percent => return None,
            LengthUnit::Em => half_points_to_emu(self.font_size()) as f64 * length.value,
            LengthUnit::Rem => half_points_to_emu(self.doc.default_font_size) as f64 * length.value,
            LengthUnit::Vw => viewport(page.width),
            LengthUnit::Vh => viewport(page.height),
            LengthUnit::Vmin => viewport(page.width.min(page.height)),
            LengthUnit::Vmax => viewport(page.width.max(page.height)),
            _ => return length.to_emu(),
        };
        Some(emu.round() as i64)
    }

    /// Resolve a length against `reference` when it is a percentage.
    pub fn resolve_length_emu(&self, length: Length, reference: Option<i64>) -> Option<i64> {
        if length.is_percent() {
            reference.map(|r| (r as f64 * length.value / 100.0).round() as i64)
        } else {
            self.length_to_emu(length)
        }
    }

    /// Final size of one dimension: the declared length (or `natural` when
    /// none resolves), capped by `max` and by the container size.
    pub fn compute_length_in_emu(
        &self,
        length: Option<Length>,
        max: Option<Length>,
        natural: i64,
        container: Option<i64>,
    ) -> i64 {
        let mut size = length
            .and_then(|l| self.resolve_length_emu(l, container))
            .unwrap_or(natural);
        if let Some(max) = max.and_then(|m| self.resolve_length_emu(m, container)) {
            size = size.min(max);
        }
        if let Some(container) = container {
            size = size.min(container);
        }
        size.max(1)
    }

    pub fn available_width_emu(&self, container: ContainerId) -> Result<i64, Error> {
        self.doc.available_width(container).map(twips_to_emu)
    }

    // -- paragraphs -------------------------------------------------------

    pub fn current_paragraph(&self) -> Option<ParagraphId> {
        self.paragraph.open
    }

    pub fn close_paragraph(&mut self) {
        self.paragraph = ParagraphState::default();
    }

    /// Adopt `paragraph` as the one inline content goes into.
    pub fn open_paragraph(&mut self, paragraph: ParagraphId) {
        self.paragraph = ParagraphState {
            open: Some(paragraph),
            whitespace: WhitespaceState::default(),
        };
    }

    fn insert_paragraph(&mut self) -> Result<ParagraphId, Error> {
        let container = self.current_container();
        let id = self
            .doc
            .insert_paragraph_after(container, self.current_block())?;
        self.replace_closest_block(BlockRef::Paragraph(id));
        Ok(id)
    }

    /// Begin a block element: reuse the open paragraph if nothing has been
    /// written to it yet, otherwise start a new one.
    pub fn start_block(&mut self) -> Result<ParagraphId, Error> {
        self.block_depth += 1;
        let id = match self.paragraph.open {
            Some(p)
                if self.current_block() == Some(BlockRef::Paragraph(p))
                    && self.doc.paragraph(p).is_empty() =>
            {
                p
            }
            _ => self.insert_paragraph()?,
        };
        self.apply_paragraph_format(id)?;
        self.open_paragraph(id);
        Ok(id)
    }

    pub fn end_block(&mut self) {
        self.block_depth = self.block_depth.saturating_sub(1);
        self.close_paragraph();
    }

    /// The paragraph inline content should go into, creating one after the
    /// closest block if the last one was closed.
    pub fn ensure_paragraph(&mut self) -> Result<ParagraphId, Error> {
        if let Some(p) = self.paragraph.open {
            return Ok(p);
        }
        let id = self.insert_paragraph()?;
        self.apply_paragraph_format(id)?;
        self.open_paragraph(id);
        Ok(id)
    }

    /// Drop `paragraph` if it is still empty and is the closest block,
    /// stepping the cursor back to the block before it. Paragraphs waiting for
    /// list numbering are kept.
    pub fn discard_if_empty(&mut self, paragraph: ParagraphId) -> Result<bool, Error> {
        if self.current_block() != Some(BlockRef::Paragraph(paragraph))
            || !self.doc.paragraph(paragraph).is_empty()
            || self.numbering.contains(paragraph)
            || self.dedupe.contains(&paragraph)
        {
            return Ok(false);
        }
        let container = self.current_container();
        let blocks = self.doc.blocks(container)?;
        let Some(pos) = blocks.iter().position(|b| *b == BlockRef::Paragraph(paragraph)) else {
            return Ok(false);
        };
        let Some(previous) = pos.checked_sub(1).map(|i| blocks[i]) else {
            return Ok(false);
        };
        self.doc.remove_block(container, BlockRef::Paragraph(paragraph))?;
        self.replace_closest_block(previous);
        if self.paragraph.open == Some(paragraph) {
            self.close_paragraph();
        }
        Ok(true)
    }

    // -- inline content ---------------------------------------------------

    /// A fresh run at the end of the open paragraph, or at the end of the
    /// enclosing hyperlink.
    pub fn new_run(&mut self) -> Result<RunRef, Error> {
        let p = self.ensure_paragraph()?;
        if let Some(link) = self.links.last_mut() {
            let slot = match link.at {
                Some((para, slot)) if para == p => slot,
                _ => {
                    let end = self.doc.paragraph(p).children.len();
                    let slot = self.doc.insert_hyperlink(p, end, link.target.clone());
                    link.at = Some((p, slot));
                    slot
                }
            };
            return self
                .doc
                .push_hyperlink_run(p, slot, Run::default())
                .ok_or_else(|| Error::InvalidStructure(format!("slot {slot} is not a hyperlink")));
        }
        let end = self.doc.paragraph(p).children.len();
        Ok(self.doc.insert_run(p, end, Run::default()))
    }

    pub fn render_text(&mut self, text: &str) -> Result<(), Error> {
        let rule = WhiteSpace::parse(&self.get_property_value("white-space", false, false));
        let mut state = match self.paragraph.open {
            Some(_) => self.paragraph.whitespace,
            None => WhitespaceState::default(),
        };
        let pieces = segment(text, rule, &mut state);
        if pieces.is_empty() {
            if self.paragraph.open.is_some() {
                self.paragraph.whitespace = state;
            }
            return Ok(());
        }
        self.ensure_paragraph()?;
        self.paragraph.whitespace = state;

        let content = pieces
            .into_iter()
            .map(|piece| match piece {
                Piece::Text(text) => RunContent::Text {
                    preserve_space: needs_preserve(&text),
                    text,
                },
                Piece::Break => RunContent::Break,
                Piece::Tab => RunContent::Tab,
            })
            .collect();
        let props = self.run_properties();
        let run = self.new_run()?;
        if let Some(r) = self.doc.run_mut(run) {
            r.props = props;
            r.content = content;
        }
        Ok(())
    }

    /// Emit a line break into the open paragraph.
    pub fn render_break(&mut self) -> Result<(), Error> {
        let props = self.run_properties();
        let run = self.new_run()?;
        if let Some(r) = self.doc.run_mut(run) {
            r.props = props;
            r.content.push(RunContent::Break);
        }
        self.paragraph.whitespace = WhitespaceState::default();
        Ok(())
    }

    /// Append pre-built runs (fields, symbols) to the open paragraph.
    pub fn render_runs(&mut self, runs: Vec<Run>) -> Result<(), Error> {
        for run in runs {
            let at = self.new_run()?;
            if let Some(r) = self.doc.run_mut(at) {
                *r = run;
            }
        }
        self.paragraph.whitespace.has_text = true;
        Ok(())
    }

    /// Embed a picture in a new run. On failure the run is taken back out so
    /// no empty run is left behind.
    pub fn render_picture(
        &mut self,
        data: Vec<u8>,
        format: ImageFormat,
        name: &str,
        width_emu: i64,
        height_emu: i64,
    ) -> Result<u32, Error> {
        let run = self.new_run()?;
        match self
            .doc
            .add_picture(run, data, format, name, width_emu, height_emu)
        {
            Ok(id) => {
                self.paragraph.whitespace.has_text = true;
                Ok(id)
            }
            Err(err) => {
                self.doc.remove_run(run);
                Err(err)
            }
        }
    }

    pub fn render_math(&mut self, omml: String) -> Result<(), Error> {
        let p = self.ensure_paragraph()?;
        let end = self.doc.paragraph(p).children.len();
        self.doc.insert_math(p, end, omml);
        self.paragraph.whitespace.has_text = true;
        Ok(())
    }

    /// Release per-render state. List levels left open by malformed markup are
    /// closed so their paragraphs still get numbered.
    pub fn finish(&mut self) {
        while self.numbering.depth() > 0 {
            if let Err(err) = self.numbering.end_level(&mut *self.doc) {
                log::warn!("Could not number unterminated list: {}", err);
                break;
            }
        }
        self.restore(StackMark {
            styles: 0,
            containers: 0,
            closest_blocks: 1,
            tables: 0,
            links: 0,
            dedupe: 0,
            block_depth: 0,
        });
        self.close_paragraph();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::DefaultImageLoader;

    fn with_context(check: impl FnOnce(&mut RenderContext)) {
        let mut doc = Document::default();
        let config = RenderConfig::default();
        let loader = DefaultImageLoader::new();
        let collaborators = Collaborators {
            registry: TagRegistry::builtin(),
            images: &loader,
            math: None,
        };
        let mut ctx = RenderContext::new(&mut doc, &config, collaborators, ContainerId::Body, None);
        check(&mut ctx);
    }

    fn emu(ctx: &RenderContext, length: &str) -> Option<i64> {
        ctx.length_to_emu(Length::parse(length).unwrap())
    }

    #[test]
    fn inline_lookup_stops_at_the_block_frame() {
        with_context(|ctx| {
            ctx.push_inline_style(
                Declaration::from_pairs(&[("background-color", "Red"), ("font-family", "Serif")]),
                true,
            );
            ctx.push_inline_style(Declaration::from_pairs(&[("color", "blue")]), false);

            assert_eq!(ctx.get_property_value("background-color", false, true), "");
            assert_eq!(ctx.get_property_value("background-color", false, false), "red");
            assert_eq!(ctx.get_property_value("font-family", true, false), "Serif");
            assert_eq!(ctx.get_property_value("color", false, true), "blue");

            ctx.pop_inline_style();
            // the block frame itself is outside an inline-only scan
            assert_eq!(ctx.get_property_value("background-color", false, true), "");
        });
    }

    #[test]
    fn viewport_and_root_units_follow_page_geometry() {
        with_context(|ctx| {
            // letter: 12240 x 15840 twips
            assert_eq!(emu(ctx, "10vw"), Some(777_240));
            assert_eq!(emu(ctx, "10vh"), Some(1_005_840));
            assert_eq!(emu(ctx, "10vmin"), Some(777_240));
            assert_eq!(emu(ctx, "10vmax"), Some(1_005_840));
            // 11pt default font
            assert_eq!(emu(ctx, "2rem"), Some(279_400));
            assert_eq!(emu(ctx, "1in"), Some(914_400));

            ctx.push_inline_style(Declaration::from_pairs(&[("font-size", "20pt")]), true);
            assert_eq!(emu(ctx, "1.5em"), Some(381_000));
            assert_eq!(emu(ctx, "2rem"), Some(279_400));
        });
    }

    #[test]
    fn percentages_need_a_reference() {
        with_context(|ctx| {
            let half = Length::percent(50.0);
            assert_eq!(ctx.length_to_emu(half), None);
            assert_eq!(ctx.resolve_length_emu(half, None), None);
            assert_eq!(ctx.resolve_length_emu(half, Some(1_000)), Some(500));
            assert_eq!(
                ctx.compute_length_in_emu(Some(half), None, 700, None),
                700
            );
            assert_eq!(
                ctx.compute_length_in_emu(Some(Length::pt(100.0)), None, 1, Some(1_000)),
                1_000
            );
        });
    }
}
