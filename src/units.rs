//! Lengths as they appear in CSS and HTML attributes, and their conversion
//! into the absolute units WordprocessingML measures in.
//!
//! Every size ends up in EMU (English Metric Units, 914400 per inch) before it
//! is converted to the unit a particular output property wants (twips for
//! paragraph and table geometry, eighths of a point for borders, half points
//! for font sizes).

use std::fmt;

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_PT: i64 = 12_700;
pub const EMU_PER_PX: i64 = 9_525;
pub const EMU_PER_TWIP: i64 = 635;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Pt,
    Px,
    In,
    Cm,
    Mm,
    Pc,
    Emu,
    Twip,
    Percent,
    Em,
    Rem,
    Vw,
    Vh,
    Vmin,
    Vmax,
}

impl LengthUnit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix {
            "pt" => LengthUnit::Pt,
            "px" => LengthUnit::Px,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "pc" => LengthUnit::Pc,
            "emu" => LengthUnit::Emu,
            "twip" | "dxa" => LengthUnit::Twip,
            "%" => LengthUnit::Percent,
            "em" => LengthUnit::Em,
            "rem" => LengthUnit::Rem,
            "vw" => LengthUnit::Vw,
            "vh" => LengthUnit::Vh,
            "vmin" => LengthUnit::Vmin,
            "vmax" => LengthUnit::Vmax,
            _ => return None,
        };
        Some(unit)
    }

    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Pt => "pt",
            LengthUnit::Px => "px",
            LengthUnit::In => "in",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::Pc => "pc",
            LengthUnit::Emu => "emu",
            LengthUnit::Twip => "twip",
            LengthUnit::Percent => "%",
            LengthUnit::Em => "em",
            LengthUnit::Rem => "rem",
            LengthUnit::Vw => "vw",
            LengthUnit::Vh => "vh",
            LengthUnit::Vmin => "vmin",
            LengthUnit::Vmax => "vmax",
        }
    }

    /// EMU per one unit, defined only for absolute units.
    pub fn emu_factor(self) -> Option<f64> {
        let factor = match self {
            LengthUnit::Pt => EMU_PER_PT,
            LengthUnit::Px => EMU_PER_PX,
            LengthUnit::In => EMU_PER_INCH,
            LengthUnit::Cm => 360_000,
            LengthUnit::Mm => 36_000,
            LengthUnit::Pc => 152_400,
            LengthUnit::Emu => 1,
            LengthUnit::Twip => EMU_PER_TWIP,
            _ => return None,
        };
        Some(factor as f64)
    }

    pub fn is_absolute(self) -> bool {
        self.emu_factor().is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub const fn px(value: f64) -> Self {
        Self::new(value, LengthUnit::Px)
    }

    pub const fn pt(value: f64) -> Self {
        Self::new(value, LengthUnit::Pt)
    }

    pub const fn percent(value: f64) -> Self {
        Self::new(value, LengthUnit::Percent)
    }

    pub const fn emu(value: i64) -> Self {
        Self::new(value as f64, LengthUnit::Emu)
    }

    /// Parse a CSS length. A bare number is only accepted when it is zero.
    pub fn parse(input: &str) -> Option<Self> {
        let (value, suffix) = split_number(input)?;
        if suffix.is_empty() {
            return (value == 0.0).then_some(Length::px(0.0));
        }
        let unit = LengthUnit::from_suffix(&suffix.to_ascii_lowercase())?;
        Some(Length::new(value, unit))
    }

    /// Parse an HTML dimension attribute (`width="120"`, `width="50%"`), where a
    /// bare number means CSS pixels.
    pub fn parse_attribute(input: &str) -> Option<Self> {
        let (value, suffix) = split_number(input)?;
        if suffix.is_empty() {
            return Some(Length::px(value));
        }
        let unit = LengthUnit::from_suffix(&suffix.to_ascii_lowercase())?;
        Some(Length::new(value, unit))
    }

    pub fn is_absolute(&self) -> bool {
        self.unit.is_absolute()
    }

    pub fn is_percent(&self) -> bool {
        self.unit == LengthUnit::Percent
    }

    /// Absolute lengths only; relative units need a context to resolve.
    pub fn to_emu(&self) -> Option<i64> {
        let factor = self.unit.emu_factor()?;
        Some((self.value * factor).round() as i64)
    }

    pub fn to_twips(&self) -> Option<i64> {
        self.to_emu().map(emu_to_twips)
    }

    /// Convert between two absolute units.
    pub fn convert(&self, unit: LengthUnit) -> Option<Length> {
        let from = self.unit.emu_factor()?;
        let to = unit.emu_factor()?;
        Some(Length::new(self.value * from / to, unit))
    }

    pub fn from_emu(emu: i64, unit: LengthUnit) -> Option<Length> {
        Length::emu(emu).convert(unit)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Split "12.5px" into (12.5, "px"). Leading/trailing whitespace is ignored.
fn split_number(input: &str) -> Option<(f64, &str)> {
    let s = input.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if end == digits_start || (end == digits_start + 1 && seen_dot) {
        return None;
    }
    let value = s[..end].parse::<f64>().ok()?;
    Some((value, s[end..].trim()))
}

pub fn emu_to_twips(emu: i64) -> i64 {
    (emu as f64 / EMU_PER_TWIP as f64).round() as i64
}

pub fn twips_to_emu(twips: i64) -> i64 {
    twips * EMU_PER_TWIP
}

pub fn emu_to_half_points(emu: i64) -> u32 {
    (emu as f64 * 2.0 / EMU_PER_PT as f64).round().max(1.0) as u32
}

pub fn half_points_to_emu(half_points: u32) -> i64 {
    half_points as i64 * EMU_PER_PT / 2
}

/// Border widths are expressed in eighths of a point, clamped to what Word
/// accepts (2..=96).
pub fn emu_to_eighth_points(emu: i64) -> u32 {
    ((emu as f64 * 8.0 / EMU_PER_PT as f64).round() as i64).clamp(2, 96) as u32
}
