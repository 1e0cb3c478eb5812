//! Mapping the active style frames onto run and paragraph properties.

use crate::css::{Declaration, first_font_family, parse_color};
use crate::error::Error;
use crate::model::{
    Alignment, Border, BorderStyle, Borders, LineSpacing, ParagraphId, RunProperties,
    UnderlineStyle, VertAlign,
};
use crate::units::{EMU_PER_PX, Length, emu_to_eighth_points, emu_to_twips};

use super::context::RenderContext;

/// A CSS colour as RGB. Unparseable values fall back to "no colour".
pub fn color_value(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match parse_color(value) {
        Some(color) => color.rgb(),
        None => {
            if !matches!(
                value.to_ascii_lowercase().as_str(),
                "inherit" | "initial" | "unset" | "currentcolor" | "auto"
            ) {
                log::warn!("Ignoring unparseable colour {:?}", value);
            }
            None
        }
    }
}

pub fn parse_alignment(value: &str) -> Option<Alignment> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" | "start" => Some(Alignment::Left),
        "center" | "-webkit-center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "justify" => Some(Alignment::Justify),
        _ => None,
    }
}

fn is_bold(weight: &str) -> bool {
    match weight {
        "bold" | "bolder" => true,
        other => other.parse::<f64>().is_ok_and(|w| w > 500.0),
    }
}

fn border_style(value: &str) -> Option<BorderStyle> {
    let style = match value.trim().to_ascii_lowercase().as_str() {
        "solid" => BorderStyle::Single,
        "dotted" => BorderStyle::Dotted,
        "dashed" => BorderStyle::Dashed,
        "double" => BorderStyle::Double,
        "groove" => BorderStyle::ThreeDEngrave,
        "ridge" => BorderStyle::ThreeDEmboss,
        "inset" => BorderStyle::Inset,
        "outset" => BorderStyle::Outset,
        _ => return None,
    };
    Some(style)
}

impl RenderContext<'_> {
    /// Run properties for text emitted under the current style frames.
    pub fn run_properties(&self) -> RunProperties {
        let mut props = RunProperties {
            font: self.config().global_font.clone().or_else(|| {
                first_font_family(&self.get_property_value("font-family", true, false))
            }),
            size: Some(self.config().global_font_size.unwrap_or(self.font_size())),
            bold: is_bold(&self.get_property_value("font-weight", false, false)),
            italic: matches!(
                self.get_property_value("font-style", false, false).as_str(),
                "italic" | "oblique"
            ),
            color: color_value(&self.get_property_value("color", false, false)),
            ..RunProperties::default()
        };

        // decorations propagate outward until something switches them off
        for value in self.property_values("text-decoration-line") {
            let value = value.to_ascii_lowercase();
            if value.split_ascii_whitespace().any(|v| v == "none") {
                break;
            }
            for line in value.split_ascii_whitespace() {
                match line {
                    "underline" if props.underline.is_none() => {
                        props.underline = Some(UnderlineStyle::Single)
                    }
                    "line-through" => props.strike = true,
                    _ => {}
                }
            }
        }
        if props.underline.is_some() {
            props.underline = Some(
                match self
                    .get_property_value("text-decoration-style", false, false)
                    .as_str()
                {
                    "double" => UnderlineStyle::Double,
                    "dotted" => UnderlineStyle::Dotted,
                    "dashed" => UnderlineStyle::Dash,
                    "wavy" => UnderlineStyle::Wave,
                    _ => UnderlineStyle::Single,
                },
            );
            props.underline_color =
                color_value(&self.get_property_value("text-decoration-color", false, false));
        }

        props.small_caps = self.get_property_value("font-variant", false, false) == "small-caps";
        props.caps = self.get_property_value("text-transform", false, false) == "uppercase";
        props.vert_align = match self.get_property_value("vertical-align", false, true).as_str() {
            "super" | "sup" => VertAlign::Superscript,
            "sub" => VertAlign::Subscript,
            _ => VertAlign::Baseline,
        };
        props.vanish = matches!(
            self.get_property_value("visibility", false, false).as_str(),
            "hidden" | "collapse"
        );
        props.shading = color_value(&self.get_property_value("background-color", false, true));
        props.spacing = Length::parse(&self.get_property_value("letter-spacing", false, false))
            .and_then(|l| self.length_to_emu(l))
            .filter(|emu| *emu != 0)
            .map(emu_to_twips);
        props
    }

    /// Paragraph properties from the block frames of the current container.
    ///
    /// Alignment, text indent and line height inherit through every frame.
    /// Left and right indentation add up the margin and padding of each block
    /// frame. Spacing, shading, borders and page breaks come from the innermost
    /// block frame only and are left untouched when it does not declare them.
    pub(crate) fn apply_paragraph_format(&mut self, paragraph: ParagraphId) -> Result<(), Error> {
        let available = self.available_width_emu(self.current_container())?;
        let mut props = self.document().paragraph(paragraph).props.clone();

        if let Some(align) = parse_alignment(&self.get_property_value("text-align", false, false)) {
            props.alignment = Some(align);
        }
        if let Some(indent) = Length::parse(&self.get_property_value("text-indent", false, false))
            .and_then(|l| self.resolve_length_emu(l, Some(available)))
        {
            props.indent_first_line = emu_to_twips(indent);
        }
        if let Some(spacing) = self.line_spacing(&self.get_property_value("line-height", false, false)) {
            props.line_spacing = Some(spacing);
        }

        let mut left = 0;
        let mut right = 0;
        let frames = self.container_frames();
        for frame in frames.iter().filter(|f| f.is_block) {
            left += self.box_offset(&frame.decl, "left", available);
            right += self.box_offset(&frame.decl, "right", available);
        }
        props.indent_left = emu_to_twips(left);
        props.indent_right = emu_to_twips(right);

        if let Some(frame) = frames.iter().rev().find(|f| f.is_block) {
            let decl = &frame.decl;
            let margin = |name: &str| {
                decl.get(name)
                    .and_then(Length::parse)
                    .and_then(|l| self.resolve_length_emu(l, Some(available)))
                    .map(|emu| emu_to_twips(emu.max(0)))
            };
            if let Some(before) = margin("margin-top") {
                props.space_before = Some(before);
            }
            if let Some(after) = margin("margin-bottom") {
                props.space_after = Some(after);
            }
            if let Some(shading) = decl.get("background-color").and_then(color_value) {
                props.shading = Some(shading);
            }
            let borders = self.declared_borders(decl);
            if !borders.is_empty() {
                props.borders = borders;
            }
            let page_break = |name: &str| {
                decl.get(name)
                    .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "always" | "page"))
            };
            if page_break("page-break-before") || page_break("break-before") {
                props.page_break_before = true;
            }
        }

        self.document_mut().paragraph_mut(paragraph).props = props;
        Ok(())
    }

    fn box_offset(&self, decl: &Declaration, side: &str, available: i64) -> i64 {
        ["margin", "padding"]
            .iter()
            .filter_map(|prop| decl.get(&format!("{prop}-{side}")))
            .filter_map(Length::parse)
            .filter_map(|l| self.resolve_length_emu(l, Some(available)))
            .sum()
    }

    fn line_spacing(&self, value: &str) -> Option<LineSpacing> {
        let value = value.trim();
        if value.is_empty() || value == "normal" {
            return None;
        }
        if let Ok(factor) = value.parse::<f64>() {
            return Some(LineSpacing::Auto((factor * 240.0).round().max(1.0) as u32));
        }
        let length = Length::parse(value)?;
        if length.is_percent() {
            return Some(LineSpacing::Auto((length.value * 2.4).round().max(1.0) as u32));
        }
        self.length_to_emu(length)
            .map(|emu| LineSpacing::AtLeast(emu_to_twips(emu)))
    }

    /// Per-side borders declared in `decl`. A side needs a visible
    /// `border-*-style` to be drawn.
    pub fn declared_borders(&self, decl: &Declaration) -> Borders {
        Borders {
            top: self.border_side(decl, "top"),
            right: self.border_side(decl, "right"),
            bottom: self.border_side(decl, "bottom"),
            left: self.border_side(decl, "left"),
        }
    }

    fn border_side(&self, decl: &Declaration, side: &str) -> Option<Border> {
        let style = border_style(decl.get(&format!("border-{side}-style"))?)?;
        let width = match decl
            .get(&format!("border-{side}-width"))
            .map(|w| w.trim().to_ascii_lowercase())
        {
            Some(w) if w == "thin" => EMU_PER_PX,
            Some(w) if w == "thick" => 5 * EMU_PER_PX,
            Some(w) if w == "medium" => 3 * EMU_PER_PX,
            Some(w) => Length::parse(&w)
                .and_then(|l| self.length_to_emu(l))
                .unwrap_or(3 * EMU_PER_PX),
            None => 3 * EMU_PER_PX,
        };
        if width <= 0 {
            return None;
        }
        Some(Border {
            style,
            size: emu_to_eighth_points(width),
            color: decl
                .get(&format!("border-{side}-color"))
                .and_then(color_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_and_alignment() {
        assert!(is_bold("bold"));
        assert!(is_bold("600"));
        assert!(!is_bold("500"));
        assert!(!is_bold("normal"));
        assert_eq!(parse_alignment("CENTER"), Some(Alignment::Center));
        assert_eq!(parse_alignment("inherit"), None);
    }

    #[test]
    fn bad_colours_fall_back_to_none() {
        assert_eq!(color_value("#ff0000"), Some([255, 0, 0]));
        assert_eq!(color_value("not-a-colour"), None);
        assert_eq!(color_value(""), None);
    }
}
