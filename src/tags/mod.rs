//! Per-tag rendering policies and the registry that dispatches to them.

mod block;
mod figure;
mod image;
mod link;
mod list;
mod math;
mod ruby;
mod style;
mod table;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::css::Declaration;
use crate::dom::Element;
use crate::error::Error;
use crate::render::RenderContext;

pub use block::{BlockPolicy, BreakPolicy, OmitPolicy, PassThroughPolicy};
pub use figure::FigurePolicy;
pub use image::{ImagePolicy, SvgPolicy};
pub use link::LinkPolicy;
pub use list::{ListItemPolicy, ListPolicy};
pub use math::{MathPolicy, SpanPolicy};
pub use ruby::RubyPolicy;
pub use style::{HeadingPolicy, InlineStylePolicy};
pub use table::{CellPolicy, TablePolicy, TableLayout, layout_table};

/// Whether traversal continues into an element's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Descend,
    Skip,
}

/// How one tag (or group of tags) renders.
///
/// For a block policy the driver opens a paragraph before `start` and closes
/// it after `end`. `end` is only called when `start` returned
/// [`Flow::Descend`].
pub trait TagPolicy: Send + Sync {
    fn tags(&self) -> &[&str];

    fn is_block(&self) -> bool {
        false
    }

    /// Declarations the element gets before its own attributes and `style`
    /// are applied.
    fn default_style(&self, _el: &Element) -> Option<Declaration> {
        None
    }

    fn start(&self, el: &mut Element, ctx: &mut RenderContext) -> Result<Flow, Error>;

    fn end(&self, _el: &Element, _ctx: &mut RenderContext) -> Result<(), Error> {
        Ok(())
    }
}

/// Lowercase tag name to policy.
#[derive(Clone, Default)]
pub struct TagRegistry {
    policies: HashMap<String, Arc<dyn TagPolicy>>,
}

static BUILTIN: OnceLock<TagRegistry> = OnceLock::new();

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in policies, built on first use and shared afterwards.
    pub fn builtin() -> &'static TagRegistry {
        BUILTIN.get_or_init(|| {
            let mut registry = TagRegistry::new();
            let builtins: Vec<Arc<dyn TagPolicy>> = vec![
                Arc::new(InlineStylePolicy),
                Arc::new(HeadingPolicy),
                Arc::new(BlockPolicy),
                Arc::new(BreakPolicy),
                Arc::new(OmitPolicy),
                Arc::new(PassThroughPolicy),
                Arc::new(ImagePolicy),
                Arc::new(SvgPolicy),
                Arc::new(ListPolicy),
                Arc::new(ListItemPolicy),
                Arc::new(TablePolicy),
                Arc::new(CellPolicy),
                Arc::new(FigurePolicy),
                Arc::new(RubyPolicy),
                Arc::new(LinkPolicy),
                Arc::new(MathPolicy),
                Arc::new(SpanPolicy),
            ];
            for policy in builtins {
                registry.register(policy);
            }
            registry
        })
    }

    /// Built-ins overlaid with `custom`; a custom policy replaces any built-in
    /// sharing one of its tags.
    pub fn with_custom(custom: &[Arc<dyn TagPolicy>]) -> TagRegistry {
        let mut registry = TagRegistry::builtin().clone();
        for policy in custom {
            registry.register(policy.clone());
        }
        registry
    }

    pub fn register(&mut self, policy: Arc<dyn TagPolicy>) {
        for tag in policy.tags() {
            self.policies.insert(tag.to_ascii_lowercase(), policy.clone());
        }
    }

    pub fn get(&self, tag: &str) -> Option<&Arc<dyn TagPolicy>> {
        self.policies.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.policies.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Push `synthetic` as an inline frame, minus whatever the element declares
/// itself so explicit styling still wins.
pub fn push_synthetic_style(ctx: &mut RenderContext, synthetic: &Declaration) {
    let own = ctx.top_declaration().cloned().unwrap_or_default();
    ctx.push_inline_style(synthetic.without(&own), false);
}
