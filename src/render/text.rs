//! Whitespace handling for text nodes, following the CSS `white-space` rules.

use crate::dom::is_xml_char;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
    BreakSpaces,
}

impl WhiteSpace {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "nowrap" => WhiteSpace::NoWrap,
            "pre" => WhiteSpace::Pre,
            "pre-wrap" => WhiteSpace::PreWrap,
            "pre-line" => WhiteSpace::PreLine,
            "break-spaces" => WhiteSpace::BreakSpaces,
            _ => WhiteSpace::Normal,
        }
    }

    pub fn preserves_spaces(self) -> bool {
        matches!(
            self,
            WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::BreakSpaces
        )
    }

    pub fn preserves_breaks(self) -> bool {
        !matches!(self, WhiteSpace::Normal | WhiteSpace::NoWrap)
    }

    pub fn preserves_trailing(self) -> bool {
        self.preserves_spaces()
    }
}

/// Whitespace state carried from one text node to the next within a
/// paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WhitespaceState {
    /// Collapsible whitespace was seen and not yet emitted.
    pub pending_space: bool,
    /// Something visible has been emitted on the current line.
    pub has_text: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Break,
    Tab,
}

fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{000C}')
}

/// Spaces that are never collapsed.
fn is_fixed_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Unicode general category Cf (which covers zero-width and bidi controls).
const FORMAT_RANGES: &[(u32, u32)] = &[
    (0x00AD, 0x00AD),
    (0x0600, 0x0605),
    (0x061C, 0x061C),
    (0x06DD, 0x06DD),
    (0x070F, 0x070F),
    (0x0890, 0x0891),
    (0x08E2, 0x08E2),
    (0x180E, 0x180E),
    (0x200B, 0x200F),
    (0x202A, 0x202E),
    (0x2060, 0x2064),
    (0x2066, 0x206F),
    (0xFEFF, 0xFEFF),
    (0xFFF9, 0xFFFB),
    (0x110BD, 0x110BD),
    (0x110CD, 0x110CD),
    (0x13430, 0x1343F),
    (0x1BCA0, 0x1BCA3),
    (0x1D173, 0x1D17A),
    (0xE0001, 0xE0001),
    (0xE0020, 0xE007F),
];

/// Format characters and control characters that have no place in a run.
pub fn is_dropped(c: char) -> bool {
    if !is_xml_char(c) {
        return true;
    }
    let cp = c as u32;
    FORMAT_RANGES
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Split one text node into literal text, breaks and tabs.
///
/// Collapsed whitespace never produces a leading space: a pending space is
/// only emitted before a visible character once something visible has been
/// written. Trailing collapsible whitespace is cut off here and carried in
/// `state` so the next text node can emit it.
pub fn segment(text: &str, rule: WhiteSpace, state: &mut WhitespaceState) -> Vec<Piece> {
    let mut text = text;
    let mut trailing_whitespace = false;
    if !rule.preserves_trailing() {
        let end = text
            .char_indices()
            .rev()
            .find(|&(_, c)| !is_collapsible(c) && !is_dropped(c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        trailing_whitespace = text[end..].chars().any(is_collapsible);
        text = &text[..end];
    }

    let mut pieces = Vec::new();
    let mut buf = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if rule.preserves_breaks() {
                    flush(&mut buf, &mut pieces);
                    pieces.push(Piece::Break);
                    state.pending_space = false;
                    state.has_text = false;
                } else {
                    state.pending_space = true;
                }
            }
            ' ' | '\t' | '\u{000C}' => {
                if rule.preserves_spaces() {
                    if c == '\t' {
                        flush(&mut buf, &mut pieces);
                        pieces.push(Piece::Tab);
                    } else {
                        buf.push(' ');
                    }
                    state.has_text = true;
                } else {
                    state.pending_space = true;
                }
            }
            c if is_fixed_space(c) => {
                buf.push(c);
                state.pending_space = false;
                state.has_text = true;
            }
            c if is_dropped(c) => {}
            c => {
                if state.pending_space && state.has_text {
                    buf.push(' ');
                }
                state.pending_space = false;
                state.has_text = true;
                buf.push(c);
            }
        }
    }
    flush(&mut buf, &mut pieces);
    if trailing_whitespace {
        state.pending_space = true;
    }
    pieces
}

fn flush(buf: &mut String, pieces: &mut Vec<Piece>) {
    if !buf.is_empty() {
        pieces.push(Piece::Text(std::mem::take(buf)));
    }
}

/// Word drops leading and trailing spaces unless the text node asks to keep
/// them.
pub fn needs_preserve(text: &str) -> bool {
    text.starts_with(' ') || text.ends_with(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, rule: WhiteSpace) -> Vec<Piece> {
        segment(text, rule, &mut WhitespaceState::default())
    }

    #[test]
    fn normal_collapses_and_trims() {
        assert_eq!(
            run("  a   b\n  c  ", WhiteSpace::Normal),
            vec![Piece::Text("a b c".into())]
        );
    }

    #[test]
    fn trailing_space_carries_to_next_node() {
        let mut state = WhitespaceState::default();
        assert_eq!(
            segment("Hello ", WhiteSpace::Normal, &mut state),
            vec![Piece::Text("Hello".into())]
        );
        assert!(state.pending_space);
        assert_eq!(
            segment("world", WhiteSpace::Normal, &mut state),
            vec![Piece::Text(" world".into())]
        );
    }

    #[test]
    fn whitespace_only_node_emits_nothing() {
        let mut state = WhitespaceState::default();
        assert!(segment(" \n\t ", WhiteSpace::Normal, &mut state).is_empty());
        assert!(!state.has_text);
    }

    #[test]
    fn pre_keeps_spaces_breaks_and_tabs() {
        assert_eq!(
            run(" a\tb\r\nc ", WhiteSpace::Pre),
            vec![
                Piece::Text(" a".into()),
                Piece::Tab,
                Piece::Text("b".into()),
                Piece::Break,
                Piece::Text("c ".into()),
            ]
        );
    }

    #[test]
    fn pre_line_keeps_breaks_only() {
        assert_eq!(
            run("a   b  \n  c", WhiteSpace::PreLine),
            vec![
                Piece::Text("a b".into()),
                Piece::Break,
                Piece::Text("c".into())
            ]
        );
    }

    #[test]
    fn fixed_spaces_survive_and_format_chars_are_dropped() {
        assert_eq!(
            run("a\u{00A0}\u{00A0}b\u{200B}c\u{202E}d", WhiteSpace::Normal),
            vec![Piece::Text("a\u{00A0}\u{00A0}bcd".into())]
        );
        assert!(is_dropped('\u{00AD}'));
        assert!(!is_dropped('a'));
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(
            run("a\u{1}b\u{8}c\u{1F}", WhiteSpace::Normal),
            vec![Piece::Text("abc".into())]
        );
        assert_eq!(
            run("x\u{7} \u{1B}y", WhiteSpace::Pre),
            vec![Piece::Text("x y".into())]
        );
    }

    #[test]
    fn preserve_flag_follows_edges() {
        assert!(needs_preserve(" a"));
        assert!(needs_preserve("a "));
        assert!(!needs_preserve("a b"));
    }
}
