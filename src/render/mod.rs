//! Walks the HTML tree and drives the tag policies against a
//! [`RenderContext`].

mod context;
mod format;
mod text;

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::css::{Declaration, element_declaration};
use crate::dom::{Element, Node, parse_fragment};
use crate::error::Error;
use crate::model::{BlockRef, ContainerId, Document};
use crate::resources::{DefaultImageLoader, ImageLoader, MathConverter};
use crate::tags::{Flow, TagPolicy, TagRegistry};

pub use context::{Collaborators, RenderContext, StackMark, StyleFrame, TableFrame};
pub use format::{color_value, parse_alignment};
pub use text::{Piece, WhiteSpace, WhitespaceState, segment};

const BLOCK_DISPLAYS: &[&str] = &["block", "list-item", "table", "flex", "grid", "flow-root"];

/// Render `root` and everything below it, then release the context's
/// per-render state.
pub fn render(ctx: &mut RenderContext, root: &mut Element) -> Result<(), Error> {
    let result = visit_element(ctx, root);
    ctx.finish();
    result
}

fn visit_element(ctx: &mut RenderContext, el: &mut Element) -> Result<(), Error> {
    let policy = ctx.registry().get(&el.name).cloned();
    let mut decl = policy
        .as_ref()
        .and_then(|p| p.default_style(el))
        .unwrap_or_default();
    decl.extend(element_declaration(el));

    let display = decl.get("display").map(|d| d.trim().to_ascii_lowercase());
    if display.as_deref() == Some("none") {
        log::debug!("Skipping <{}> with display: none", el.name);
        return Ok(());
    }
    // `display` may promote an inline element, never demote a structural one
    let promoted = display
        .as_deref()
        .is_some_and(|d| BLOCK_DISPLAYS.contains(&d) && !el.is_block());
    let is_block = match &policy {
        Some(policy) => policy.is_block() || promoted,
        None => el.is_block() || promoted,
    };

    let mark = ctx.mark();
    let result = visit_with(ctx, el, policy, decl, is_block);
    ctx.restore(mark);

    match result {
        Err(err) if !err.is_fatal() => {
            log::warn!("Skipping rest of <{}>: {}", el.name, err);
            ctx.close_paragraph();
            Ok(())
        }
        other => other,
    }
}

fn visit_with(
    ctx: &mut RenderContext,
    el: &mut Element,
    policy: Option<Arc<dyn TagPolicy>>,
    decl: Declaration,
    is_block: bool,
) -> Result<(), Error> {
    ctx.push_inline_style(decl, is_block || el.is_block());
    if is_block {
        ctx.start_block()?;
    }

    let flow = match &policy {
        Some(policy) => policy.start(el, ctx)?,
        None => Flow::Descend,
    };
    if flow == Flow::Descend {
        for child in el.children.iter_mut() {
            match child {
                Node::Text(text) => ctx.render_text(text)?,
                Node::Element(child) => visit_element(ctx, child)?,
            }
        }
        if let Some(policy) = &policy {
            policy.end(el, ctx)?;
        }
    }

    if is_block {
        ctx.end_block();
    }
    ctx.pop_inline_style();
    Ok(())
}

/// Owns the configuration and collaborators, and renders fragments into
/// documents with them.
pub struct HtmlRenderer {
    config: RenderConfig,
    registry: Cow<'static, TagRegistry>,
    images: Box<dyn ImageLoader>,
    math: Option<Box<dyn MathConverter>>,
}

impl HtmlRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let registry = if config.custom_policies.is_empty() {
            Cow::Borrowed(TagRegistry::builtin())
        } else {
            Cow::Owned(TagRegistry::with_custom(&config.custom_policies))
        };
        Self {
            config,
            registry,
            images: Box::new(DefaultImageLoader::new()),
            math: None,
        }
    }

    pub fn with_image_loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.images = Box::new(loader);
        self
    }

    pub fn with_math_converter(mut self, converter: impl MathConverter + 'static) -> Self {
        self.math = Some(Box::new(converter));
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `root` into `container`, right after `anchor` (or at the end of
    /// the container).
    pub fn render_into(
        &self,
        doc: &mut Document,
        container: ContainerId,
        anchor: Option<BlockRef>,
        root: &mut Element,
    ) -> Result<(), Error> {
        let collaborators = Collaborators {
            registry: &self.registry,
            images: self.images.as_ref(),
            math: self.math.as_deref(),
        };
        let mut ctx = RenderContext::new(doc, &self.config, collaborators, container, anchor);
        render(&mut ctx, root)
    }

    /// Parse `html` and append it to the end of the document body.
    pub fn render_html(&self, doc: &mut Document, html: &str) -> Result<(), Error> {
        let mut root = parse_fragment(html);
        let anchor = doc.body().last().copied();
        self.render_into(doc, ContainerId::Body, anchor, &mut root)?;
        doc.ensure_trailing_paragraph(ContainerId::Body)?;
        Ok(())
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        HtmlRenderer::new(RenderConfig::default())
    }
}
