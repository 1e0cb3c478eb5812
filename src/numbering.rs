//! Nested list tracking and numbering definitions.
//!
//! Lists open and close levels as traversal enters and leaves `ul`/`ol`.
//! Paragraphs are only bound to a numbering definition once their level
//! closes, because the definition is keyed by the formats of every level open
//! at that point. Definitions are shared between lists; every top-level list
//! gets its own instance so it counts from its own start.

use crate::error::Error;
use crate::model::{Document, LevelSuffix, NumberFormat, NumberingLevel, NumberingRef, ParagraphId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListStyle {
    Decimal,
    DecimalLeadingZero,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    Disc,
    Circle,
    Square,
    None,
}

impl ListStyle {
    /// `list-style-type` keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        let style = match value.trim().to_ascii_lowercase().as_str() {
            "decimal" => ListStyle::Decimal,
            "decimal-leading-zero" => ListStyle::DecimalLeadingZero,
            "lower-alpha" | "lower-latin" => ListStyle::LowerAlpha,
            "upper-alpha" | "upper-latin" => ListStyle::UpperAlpha,
            "lower-roman" => ListStyle::LowerRoman,
            "upper-roman" => ListStyle::UpperRoman,
            "disc" => ListStyle::Disc,
            "circle" => ListStyle::Circle,
            "square" => ListStyle::Square,
            "none" => ListStyle::None,
            _ => return None,
        };
        Some(style)
    }

    /// HTML `type` attribute; case matters for ordered lists.
    pub fn from_type_attribute(value: &str) -> Option<Self> {
        let style = match value.trim() {
            "1" => ListStyle::Decimal,
            "a" => ListStyle::LowerAlpha,
            "A" => ListStyle::UpperAlpha,
            "i" => ListStyle::LowerRoman,
            "I" => ListStyle::UpperRoman,
            other => match other.to_ascii_lowercase().as_str() {
                "disc" => ListStyle::Disc,
                "circle" => ListStyle::Circle,
                "square" => ListStyle::Square,
                _ => return None,
            },
        };
        Some(style)
    }

    pub fn is_ordered(self) -> bool {
        !matches!(
            self,
            ListStyle::Disc | ListStyle::Circle | ListStyle::Square | ListStyle::None
        )
    }

    pub fn number_format(self) -> NumberFormat {
        match self {
            ListStyle::Decimal => NumberFormat::Decimal,
            ListStyle::DecimalLeadingZero => NumberFormat::DecimalZero,
            ListStyle::LowerAlpha => NumberFormat::LowerLetter,
            ListStyle::UpperAlpha => NumberFormat::UpperLetter,
            ListStyle::LowerRoman => NumberFormat::LowerRoman,
            ListStyle::UpperRoman => NumberFormat::UpperRoman,
            ListStyle::Disc | ListStyle::Circle | ListStyle::Square => NumberFormat::Bullet,
            ListStyle::None => NumberFormat::None,
        }
    }

    /// Level text for a level at zero-based `level`.
    pub fn level_text(self, level: usize) -> String {
        match self {
            ListStyle::Disc => "\u{2022}".to_string(),
            ListStyle::Circle => "\u{25E6}".to_string(),
            ListStyle::Square => "\u{25AA}".to_string(),
            ListStyle::None => String::new(),
            _ => format!("%{}.", level + 1),
        }
    }

    fn key(self) -> &'static str {
        match self {
            ListStyle::Decimal => "decimal",
            ListStyle::DecimalLeadingZero => "decimal-zero",
            ListStyle::LowerAlpha => "lower-alpha",
            ListStyle::UpperAlpha => "upper-alpha",
            ListStyle::LowerRoman => "lower-roman",
            ListStyle::UpperRoman => "upper-roman",
            ListStyle::Disc => "disc",
            ListStyle::Circle => "circle",
            ListStyle::Square => "square",
            ListStyle::None => "none",
        }
    }
}

/// Appearance of one list nesting level. Offsets are in twips.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelDescription {
    pub style: ListStyle,
    pub left: i64,
    pub right: i64,
    pub hanging: bool,
    pub start: u32,
}

impl LevelDescription {
    pub fn new(style: ListStyle) -> Self {
        Self {
            style,
            left: 0,
            right: 0,
            hanging: true,
            start: 1,
        }
    }
}

/// Reuse key for a stack of levels.
pub fn signature(levels: &[LevelDescription]) -> String {
    levels
        .iter()
        .map(|l| {
            format!(
                "{}:{}:{}:{}:{}",
                l.style.key(),
                l.left,
                l.right,
                if l.hanging { "h" } else { "-" },
                l.start
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug)]
pub struct NumberingContext {
    base_indent: i64,
    suffix: LevelSuffix,
    levels: Vec<LevelDescription>,
    /// Paragraphs recorded per open level.
    pending: Vec<Vec<ParagraphId>>,
    /// Instances allocated for the outermost list currently open, keyed by
    /// abstract id.
    instances: Vec<(u32, u32)>,
}

impl NumberingContext {
    pub fn new(base_indent: i64, suffix: LevelSuffix) -> Self {
        Self {
            base_indent,
            suffix,
            levels: Vec::new(),
            pending: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn start_level(&mut self, level: LevelDescription) {
        if self.levels.is_empty() {
            // a new top-level list restarts its numbering
            self.pending.clear();
            self.instances.clear();
        }
        self.levels.push(level);
        self.pending.push(Vec::new());
    }

    /// Record `paragraph` at the innermost open level. Returns false when no
    /// list is open, leaving the paragraph unnumbered.
    pub fn add(&mut self, paragraph: ParagraphId) -> bool {
        match self.pending.last_mut() {
            Some(paragraphs) => {
                if !paragraphs.contains(&paragraph) {
                    paragraphs.push(paragraph);
                }
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, paragraph: ParagraphId) -> bool {
        self.pending.iter().any(|p| p.contains(&paragraph))
    }

    /// Close the innermost level, binding its paragraphs to the list instance
    /// for the current level stack. Returns the instance's `num_id`, if a
    /// level was open.
    pub fn end_level(&mut self, doc: &mut Document) -> Result<Option<u32>, Error> {
        if self.levels.is_empty() {
            return Ok(None);
        }
        let level = self.levels.len() - 1;
        let key = signature(&self.levels);
        let abstract_id = match doc.find_numbering(&key) {
            Some(id) => id,
            None => {
                let definition = self.definition_levels();
                log::debug!("New numbering definition for {key}");
                doc.add_numbering(key, definition)
            }
        };
        let num_id = match self.instances.iter().find(|(a, _)| *a == abstract_id) {
            Some(&(_, num_id)) => num_id,
            None => {
                let num_id = doc.add_numbering_instance(abstract_id)?;
                self.instances.push((abstract_id, num_id));
                num_id
            }
        };

        let paragraphs = self.pending.pop().unwrap_or_default();
        for id in paragraphs {
            let props = &mut doc.paragraph_mut(id).props;
            props.numbering = Some(NumberingRef {
                num_id,
                level: level as u8,
            });
            // the numbering definition owns the indentation of list paragraphs
            props.indent_left = 0;
            props.indent_first_line = 0;
        }
        self.levels.pop();
        if self.levels.is_empty() {
            self.pending.clear();
        }
        Ok(Some(num_id))
    }

    fn definition_levels(&self) -> Vec<NumberingLevel> {
        let mut left_offset = 0;
        let mut right_offset = 0;
        self.levels
            .iter()
            .enumerate()
            .map(|(i, desc)| {
                left_offset += desc.left;
                right_offset += desc.right;
                let hanging = if desc.hanging { self.base_indent } else { 0 };
                NumberingLevel {
                    format: desc.style.number_format(),
                    text: desc.style.level_text(i),
                    start: desc.start,
                    indent_left: (i as i64 + 1) * self.base_indent + left_offset,
                    indent_right: right_offset,
                    hanging,
                    suffix: self.suffix,
                    font: None,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContainerId;

    #[test]
    fn sibling_lists_share_a_definition_but_not_an_instance() {
        let mut doc = Document::default();
        let a = doc.add_paragraph(ContainerId::Body).unwrap();
        let b = doc.add_paragraph(ContainerId::Body).unwrap();
        let mut numbering = NumberingContext::new(360, LevelSuffix::Tab);

        numbering.start_level(LevelDescription::new(ListStyle::Decimal));
        numbering.add(a);
        let first = numbering.end_level(&mut doc).unwrap().unwrap();

        numbering.start_level(LevelDescription::new(ListStyle::Decimal));
        numbering.add(b);
        let second = numbering.end_level(&mut doc).unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(doc.numbering().len(), 1);
        assert_eq!(doc.numbering_instances().len(), 2);
        assert_eq!(
            doc.numbering_definition(first),
            doc.numbering_definition(second)
        );

        numbering.start_level(LevelDescription::new(ListStyle::LowerRoman));
        let third = numbering.end_level(&mut doc).unwrap().unwrap();
        assert_eq!(doc.numbering().len(), 2);
        assert_ne!(
            doc.numbering_definition(first),
            doc.numbering_definition(third)
        );
    }

    #[test]
    fn nested_levels_reuse_the_outer_list_instance() {
        let mut doc = Document::default();
        let mut numbering = NumberingContext::new(360, LevelSuffix::Tab);
        numbering.start_level(LevelDescription::new(ListStyle::Decimal));
        numbering.start_level(LevelDescription::new(ListStyle::Decimal));
        let inner = numbering.end_level(&mut doc).unwrap().unwrap();
        numbering.start_level(LevelDescription::new(ListStyle::Decimal));
        let again = numbering.end_level(&mut doc).unwrap().unwrap();
        numbering.end_level(&mut doc).unwrap();
        assert_eq!(inner, again);
        assert_eq!(doc.numbering_instances().len(), 2);
    }

    #[test]
    fn instances_override_level_starts() {
        let mut doc = Document::default();
        let mut numbering = NumberingContext::new(360, LevelSuffix::Tab);
        let mut level = LevelDescription::new(ListStyle::Decimal);
        level.start = 4;
        numbering.start_level(level);
        let id = numbering.end_level(&mut doc).unwrap().unwrap();
        let instance = doc
            .numbering_instances()
            .iter()
            .find(|i| i.num_id == id)
            .unwrap();
        assert_eq!(instance.start_overrides, vec![4]);
    }

    #[test]
    fn add_without_open_level_is_ignored() {
        let mut doc = Document::default();
        let p = doc.add_paragraph(ContainerId::Body).unwrap();
        let mut numbering = NumberingContext::new(360, LevelSuffix::Tab);
        assert!(!numbering.add(p));
        assert!(numbering.end_level(&mut doc).unwrap().is_none());
        assert!(doc.paragraph(p).props.numbering.is_none());
    }

    #[test]
    fn indents_accumulate_per_level() {
        let mut doc = Document::default();
        let mut numbering = NumberingContext::new(360, LevelSuffix::Space);
        let mut outer = LevelDescription::new(ListStyle::Disc);
        outer.left = 100;
        numbering.start_level(outer);
        let mut inner = LevelDescription::new(ListStyle::Decimal);
        inner.left = 50;
        inner.hanging = false;
        numbering.start_level(inner);
        let id = numbering.end_level(&mut doc).unwrap().unwrap();
        let def = doc.numbering_definition(id).unwrap();
        assert_eq!(def.levels[0].indent_left, 460);
        assert_eq!(def.levels[0].hanging, 360);
        assert_eq!(def.levels[0].text, "\u{2022}");
        assert_eq!(def.levels[1].indent_left, 870);
        assert_eq!(def.levels[1].hanging, 0);
        assert_eq!(def.levels[1].text, "%2.");
        assert_eq!(def.levels[1].suffix, LevelSuffix::Space);
    }
}
