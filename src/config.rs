use std::fmt;
use std::sync::Arc;

use crate::model::LevelSuffix;
use crate::tags::TagPolicy;

/// Knobs a host sets once per render. Everything defaults to "follow the
/// HTML".
#[derive(Clone)]
pub struct RenderConfig {
    /// Font family forced onto every run, regardless of CSS.
    pub global_font: Option<String>,
    /// Font size in half points forced onto every run.
    pub global_font_size: Option<u32>,
    /// Give tables nested in a table cell the default grid border too.
    pub table_in_cell_border: bool,
    /// Policies overlaid on the built-in tag registry, replacing built-ins that
    /// claim the same tag.
    pub custom_policies: Vec<Arc<dyn TagPolicy>>,
    /// Indent added per list nesting level, in twips.
    pub numbering_indent: i64,
    pub level_suffix: LevelSuffix,
    pub hyperlink_color: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            global_font: None,
            global_font_size: None,
            table_in_cell_border: false,
            custom_policies: Vec::new(),
            numbering_indent: 360,
            level_suffix: LevelSuffix::Tab,
            hyperlink_color: [0x05, 0x63, 0xC1],
        }
    }
}

impl RenderConfig {
    pub fn with_global_font(mut self, font: impl Into<String>) -> Self {
        self.global_font = Some(font.into());
        self
    }

    pub fn with_global_font_size(mut self, half_points: u32) -> Self {
        self.global_font_size = Some(half_points.max(1));
        self
    }

    pub fn with_table_in_cell_border(mut self, enabled: bool) -> Self {
        self.table_in_cell_border = enabled;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn TagPolicy>) -> Self {
        self.custom_policies.push(policy);
        self
    }

    pub fn with_numbering_indent(mut self, twips: i64) -> Self {
        self.numbering_indent = twips.max(0);
        self
    }

    pub fn with_level_suffix(mut self, suffix: LevelSuffix) -> Self {
        self.level_suffix = suffix;
        self
    }

    pub fn with_hyperlink_color(mut self, rgb: [u8; 3]) -> Self {
        self.hyperlink_color = rgb;
        self
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let custom: Vec<&[&str]> = self.custom_policies.iter().map(|p| p.tags()).collect();
        f.debug_struct("RenderConfig")
            .field("global_font", &self.global_font)
            .field("global_font_size", &self.global_font_size)
            .field("table_in_cell_border", &self.table_in_cell_border)
            .field("custom_policies", &custom)
            .field("numbering_indent", &self.numbering_indent)
            .field("level_suffix", &self.level_suffix)
            .field("hyperlink_color", &self.hyperlink_color)
            .finish()
    }
}
