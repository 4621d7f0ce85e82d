use super::style::{FontFace, FontSpec, Theme};
use crate::core::models::document::{Inline, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Span {
    pub text: String,
    pub style: TextStyle,
}

pub(crate) type Line = Vec<Span>;

// Average advance of the standard Type1 faces, as a fraction of the font size.
fn width_factor(face: FontFace) -> f32 {
    match face {
        FontFace::Regular => 0.5,
        FontFace::Bold => 0.54,
        FontFace::Italic => 0.48,
    }
}

pub(crate) fn text_width(text: &str, spec: &FontSpec) -> f32 {
    text.chars().count() as f32 * spec.size * width_factor(spec.face)
}

pub(crate) fn line_width(line: &[Span], theme: &Theme) -> f32 {
    line.iter()
        .map(|span| text_width(&span.text, theme.font(span.style)))
        .sum()
}

/// Height of a line: the tallest run it holds, with 25% leading.
pub(crate) fn line_height(line: &[Span], theme: &Theme) -> f32 {
    line.iter()
        .map(|span| theme.font(span.style).size)
        .fold(0.0_f32, f32::max)
        .max(theme.normal.size)
        * 1.25
}

fn push_piece(line: &mut Line, text: &str, style: TextStyle) {
    match line.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => line.push(Span {
            text: text.to_string(),
            style,
        }),
    }
}

/// Greedy word wrap of styled runs into lines no wider than `max_width`.
///
/// Explicit breaks always start a new line, so two consecutive breaks yield an
/// empty line. A single word wider than `max_width` overflows its line.
pub(crate) fn wrap_inlines(inlines: &[Inline], theme: &Theme, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Line = Vec::new();
    let mut width = 0.0_f32;

    for inline in inlines {
        match inline {
            Inline::Break => {
                lines.push(std::mem::take(&mut current));
                width = 0.0;
            }
            Inline::Text { text, style } => {
                let spec = theme.font(*style);
                for piece in text.split_inclusive(' ') {
                    let mut piece = piece;
                    let mut piece_width = text_width(piece, spec);
                    if !current.is_empty() && width + piece_width > max_width {
                        lines.push(std::mem::take(&mut current));
                        piece = piece.trim_start();
                        piece_width = text_width(piece, spec);
                        width = 0.0;
                    }
                    if piece.is_empty() {
                        continue;
                    }
                    push_piece(&mut current, piece, *style);
                    width += piece_width;
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes text for a WinAnsi-encoded standard font; characters outside Latin-1 become `?`.
pub(crate) fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(line: &Line) -> String {
        line.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let theme = Theme::default();
        let lines = wrap_inlines(&[Inline::text("Hello world", TextStyle::Normal)], &theme, 500.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(joined(&lines[0]), "Hello world");
    }

    #[test]
    fn long_text_wraps_at_word_boundaries() {
        let theme = Theme::default();
        // 6pt per character at 12pt regular: "aaaa " is 30pt wide.
        let text = "aaaa bbbb cccc dddd";
        let lines = wrap_inlines(&[Inline::text(text, TextStyle::Normal)], &theme, 60.0);
        let texts: Vec<String> = lines.iter().map(joined).collect();
        assert_eq!(texts, ["aaaa bbbb ", "cccc dddd"]);
    }

    #[test]
    fn breaks_start_new_lines_and_keep_empty_ones() {
        let theme = Theme::default();
        let inlines = [
            Inline::text("one", TextStyle::Normal),
            Inline::Break,
            Inline::Break,
            Inline::text("two", TextStyle::Normal),
        ];
        let lines = wrap_inlines(&inlines, &theme, 500.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
    }

    #[test]
    fn adjacent_runs_of_different_styles_stay_separate() {
        let theme = Theme::default();
        let inlines = [
            Inline::text("C", TextStyle::Normal),
            Inline::text("6", TextStyle::Subscript),
            Inline::text("H", TextStyle::Normal),
        ];
        let lines = wrap_inlines(&inlines, &theme, 500.0);
        assert_eq!(lines[0].len(), 3);
        assert_eq!(lines[0][1].style, TextStyle::Subscript);
        assert!(line_height(&lines[0], &theme) >= theme.normal.size);
    }

    #[test]
    fn encodes_latin1_and_replaces_the_rest() {
        assert_eq!(encode_text("Å"), vec![0xC5]);
        assert_eq!(encode_text("a→b"), b"a?b".to_vec());
    }
}
