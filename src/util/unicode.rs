use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Longest prefix of whole grapheme clusters no wider than `budget` cells
fn take_width(s: &str, budget: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if width + w > budget {
            break;
        }
        width += w;
        out.push_str(grapheme);
    }
    out
}

/// Truncate to at most `max_cells` terminal cells, ending in `…` when cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let mut out = take_width(s, max_cells - 1);
    out.push('\u{2026}');
    out
}

/// Greedy word wrap into at most `max_lines` lines of `max_cells` cells.
/// Overlong words are truncated; if text is left over, the last line ends in `…`.
pub fn wrap_to_width(s: &str, max_cells: usize, max_lines: usize) -> Vec<String> {
    if max_cells == 0 || max_lines == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        let word = truncate_to_width(word, max_cells);
        if current.is_empty()
            || display_width(&current) + 1 + display_width(&word) <= max_cells
        {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
            continue;
        }
        lines.push(std::mem::replace(&mut current, word));
        if lines.len() == max_lines {
            if let Some(last) = lines.last_mut() {
                let mut cut = take_width(last, max_cells - 1);
                cut.push('\u{2026}');
                *last = cut;
            }
            return lines;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
