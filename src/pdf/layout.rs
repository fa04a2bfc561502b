use crate::fonts::FontEntry;

pub(super) struct TextLine {
    pub(super) text: String,
    pub(super) width: f32,
}

fn finish_line(current: &mut String, width: &mut f32) -> TextLine {
    let line = TextLine {
        text: std::mem::take(current),
        width: *width,
    };
    *width = 0.0;
    line
}

/// Split a word wider than `max_width` into pieces that each fit.
fn break_long_word(word: &str, entry: &FontEntry, font_size: f32, max_width: f32) -> Vec<(String, f32)> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_w = 0.0f32;
    for ch in word.chars() {
        let cw = entry.char_width_1000(ch) * font_size / 1000.0;
        if !piece.is_empty() && piece_w + cw > max_width {
            pieces.push((std::mem::take(&mut piece), piece_w));
            piece_w = 0.0;
        }
        piece.push(ch);
        piece_w += cw;
    }
    if !piece.is_empty() {
        pieces.push((piece, piece_w));
    }
    pieces
}

/// Wrap text into lines no wider than `max_width`.
/// Explicit newlines always start a new line; an empty input line is kept as
/// an empty output line so blank lines in multi-line values survive. Runs of
/// whitespace inside a line collapse to a single space.
pub(super) fn wrap_text(
    text: &str,
    entry: &FontEntry,
    font_size: f32,
    max_width: Option<f32>,
) -> Vec<TextLine> {
    let space_w = entry.space_width(font_size);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in raw_line.split_whitespace() {
            let ww = entry.word_width(word, font_size);
            let need_space = !current.is_empty();
            let proposed = current_w + if need_space { space_w } else { 0.0 } + ww;

            match max_width {
                Some(max) if proposed > max => {
                    if !current.is_empty() {
                        lines.push(finish_line(&mut current, &mut current_w));
                    }
                    if ww > max {
                        let mut pieces = break_long_word(word, entry, font_size, max);
                        let last = pieces.pop();
                        for (piece, w) in pieces {
                            lines.push(TextLine { text: piece, width: w });
                        }
                        if let Some((piece, w)) = last {
                            current = piece;
                            current_w = w;
                        }
                    } else {
                        current.push_str(word);
                        current_w = ww;
                    }
                }
                _ => {
                    if need_space {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_w = proposed;
                }
            }
        }

        lines.push(finish_line(&mut current, &mut current_w));
    }

    lines
}
