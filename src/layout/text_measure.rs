//! Text measurement in terminal cells.
//!
//! Widths are grapheme-based: wide (CJK, most emoji) clusters count 2 cells,
//! zero-width marks and controls count 0. Wrapping prefers word breaks and
//! falls back to breaking inside a word only when the word alone exceeds the
//! line width.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal cells.
///
/// Embedded newlines delimit lines; the widest line wins.
pub fn string_width(s: &str) -> u16 {
    s.split('\n')
        .map(line_width)
        .max()
        .unwrap_or(0)
}

fn line_width(line: &str) -> u16 {
    line.graphemes(true)
        .map(grapheme_width)
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn grapheme_width(g: &str) -> usize {
    if g.chars().all(|c| c.is_control()) {
        0
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// Wrap text to `width` cells. Word-break preferred, char-break fallback.
///
/// Returns one string per output line; empty input yields no lines.
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![text.to_string()];
    }

    let width = width as usize;
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0usize;

        for word in raw_line.split_word_bounds() {
            let word_w: usize = word.graphemes(true).map(grapheme_width).sum();

            if current_w + word_w <= width {
                current.push_str(word);
                current_w += word_w;
                continue;
            }

            if word.trim().is_empty() {
                // A separator that does not fit just breaks the line.
                lines.push(current);
                current = String::new();
                current_w = 0;
                continue;
            }

            if word_w <= width {
                lines.push(std::mem::take(&mut current));
                current_w = 0;
                current.push_str(word);
                current_w += word_w;
            } else {
                // Word longer than the line: break inside it.
                for g in word.graphemes(true) {
                    let gw = grapheme_width(g);
                    if current_w + gw > width && current_w > 0 {
                        lines.push(std::mem::take(&mut current));
                        current_w = 0;
                    }
                    current.push_str(g);
                    current_w += gw;
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Number of lines `text` occupies when wrapped to `available_width`.
///
/// Empty text measures 0; non-empty text measures at least 1.
pub fn measure_text_height(text: &str, available_width: u16) -> u16 {
    if text.is_empty() {
        return 0;
    }
    wrap_text(text, available_width).len().max(1) as u16
}

/// Truncate to `width` cells, appending `ellipsis` when content was clipped.
pub fn truncate_text(text: &str, width: u16, ellipsis: &str) -> String {
    if width == 0 {
        return String::new();
    }

    if string_width(text) <= width {
        return text.to_string();
    }

    let ellipsis_w = line_width(ellipsis) as usize;
    let target = (width as usize).saturating_sub(ellipsis_w);

    let mut result = String::new();
    let mut current_w = 0usize;
    for g in text.graphemes(true) {
        let gw = grapheme_width(g);
        if current_w + gw > target {
            break;
        }
        result.push_str(g);
        current_w += gw;
    }

    result.push_str(ellipsis);
    result
}
