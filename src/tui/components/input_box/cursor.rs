//! Caret position and internal scrolling for the input box.
//!
//! The text itself is owned by `InputBox` and passed in explicitly.

use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::text_wrap::{BORDER_OFFSET, inner_width, wrap_options, wrapped_lines};

pub(super) struct Caret {
    /// Byte offset into the buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible wrapped line
    pub scroll: u16,
    /// Outer width at the last render, used for Up/Down between frames
    pub last_width: u16,
}

impl Caret {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll: 0,
            last_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll = 0;
    }

    /// Wrapped line the caret sits on.
    pub fn line(&self, buffer: &str, outer_width: u16) -> u16 {
        let width = inner_width(outer_width);
        if width == 0 {
            return 0;
        }
        let before = &buffer[..clamp_to_boundary(buffer, self.pos)];
        let lines = textwrap::wrap(before, wrap_options(width));
        let mut line = lines.len().saturating_sub(1) as u16;
        if before.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
            line += 1;
        }
        line
    }

    /// Keep the caret inside a window of `max_lines` lines.
    pub fn follow(&mut self, buffer: &str, outer_width: u16, max_lines: u16) {
        let total = wrapped_lines(buffer, inner_width(outer_width));
        if total <= max_lines {
            self.scroll = 0;
            return;
        }
        let line = self.line(buffer, outer_width);
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + max_lines {
            self.scroll = line + 1 - max_lines;
        }
    }

    /// Move one wrapped line up (`-1`) or down (`1`), keeping the display
    /// column where the target line is long enough. Returns whether the
    /// caret moved.
    pub fn step_line(&mut self, buffer: &str, direction: i8) -> bool {
        let width = inner_width(self.last_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }
        let ranges = line_ranges(buffer, width);
        let pos = clamp_to_boundary(buffer, self.pos);

        let current = ranges
            .iter()
            .rposition(|&(start, _)| start <= pos)
            .unwrap_or(0);
        let (start, end) = ranges[current];
        let column = buffer[start..pos.min(end)].width();

        let target = match direction {
            d if d < 0 && current > 0 => current - 1,
            d if d > 0 && current + 1 < ranges.len() => current + 1,
            _ => return false,
        };

        let (target_start, target_end) = ranges[target];
        let line = &buffer[target_start..target_end];
        let mut cells = 0;
        let mut offset = line.len();
        for (i, c) in line.char_indices() {
            let w = c.width().unwrap_or(0);
            if cells + w > column {
                offset = i;
                break;
            }
            cells += w;
        }
        self.pos = target_start + offset;
        true
    }

    /// Screen cell for the terminal cursor inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }

        let before = &buffer[..clamp_to_boundary(buffer, self.pos)];
        // Column is counted in display cells from the last hard newline,
        // because textwrap drops trailing spaces from wrapped segments.
        let logical = &before[before.rfind('\n').map_or(0, |i| i + 1)..];
        let segments = textwrap::wrap(logical, wrap_options(width));
        let consumed: usize = segments
            .iter()
            .take(segments.len().saturating_sub(1))
            .map(|s| s.width())
            .sum();
        let column = logical.width().saturating_sub(consumed) as u16;

        let row = self.line(buffer, area.width).saturating_sub(self.scroll);
        (
            area.x + BORDER_OFFSET + column.min(width),
            area.y + BORDER_OFFSET + row,
        )
    }
}

/// Largest char boundary not past `pos`.
fn clamp_to_boundary(buffer: &str, pos: usize) -> usize {
    let mut pos = pos.min(buffer.len());
    while !buffer.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Byte range of each wrapped line within `buffer`.
///
/// textwrap drops the spaces at a soft wrap and the newline at a hard one,
/// so each line is located in the buffer rather than summed from lengths.
fn line_ranges(buffer: &str, width: u16) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut cursor = 0;
    for line in textwrap::wrap(buffer, wrap_options(width)) {
        let start = if line.is_empty() {
            cursor
        } else {
            buffer[cursor..]
                .find(&*line)
                .map_or(cursor, |i| cursor + i)
        };
        let end = start + line.len();
        ranges.push((start, end));

        cursor = end;
        let rest = &buffer[cursor..];
        let spaces = rest.len() - rest.trim_start_matches(' ').len();
        cursor += spaces;
        if buffer[cursor..].starts_with('\n') {
            cursor += 1;
        }
    }
    if buffer.ends_with('\n') && ranges.last().is_none_or(|&(start, _)| start < buffer.len()) {
        ranges.push((buffer.len(), buffer.len()));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_counts_hard_newlines() {
        let mut caret = Caret::new();
        let buffer = "one\ntwo\n";
        caret.pos = buffer.len();
        assert_eq!(caret.line(buffer, 40), 2);
        caret.pos = 4;
        assert_eq!(caret.line(buffer, 40), 1);
    }

    #[test]
    fn follow_scrolls_to_keep_caret_visible() {
        let mut caret = Caret::new();
        let buffer = "1\n2\n3\n4\n5\n6\n7";
        caret.pos = buffer.len();
        caret.follow(buffer, 40, 3);
        assert_eq!(caret.scroll, 4);

        caret.pos = 0;
        caret.follow(buffer, 40, 3);
        assert_eq!(caret.scroll, 0);
    }

    #[test]
    fn step_line_keeps_column() {
        let mut caret = Caret::new();
        let buffer = "hello\nhi\nworld";
        caret.pos = 4; // "hell|o"
        assert!(caret.step_line(buffer, 1));
        assert_eq!(caret.pos, 8); // clamped to end of "hi"
        assert!(caret.step_line(buffer, 1));
        assert_eq!(caret.pos, 11); // "wo|rld"
        assert!(!caret.step_line(buffer, 1));
        assert!(caret.step_line(buffer, -1));
        assert_eq!(caret.pos, 8);
    }

    #[test]
    fn screen_pos_counts_wide_characters() {
        let mut caret = Caret::new();
        let buffer = "日本";
        caret.pos = buffer.len();
        let area = Rect::new(0, 0, 20, 3);
        assert_eq!(caret.screen_pos(buffer, area), (5, 1));
    }

    #[test]
    fn screen_pos_inside_border() {
        let mut caret = Caret::new();
        let buffer = "ab\ncd";
        caret.pos = buffer.len();
        let area = Rect::new(0, 10, 20, 4);
        assert_eq!(caret.screen_pos(buffer, area), (3, 12));
    }

    #[test]
    fn step_line_lands_on_char_boundaries() {
        let mut caret = Caret::new();
        let buffer = "é\naé";
        caret.pos = buffer.len();
        assert!(caret.step_line(buffer, -1));
        assert_eq!(caret.pos, 2); // end of "é"
        assert!(caret.step_line(buffer, 1));
        assert_eq!(caret.pos, 4); // "a|é"
        assert!(buffer.is_char_boundary(caret.pos));
    }

    #[test]
    fn step_line_across_soft_wrap() {
        let mut caret = Caret::new();
        caret.last_width = 9; // five columns of text
        let buffer = "hello world";
        caret.pos = buffer.len();
        assert!(caret.step_line(buffer, -1));
        assert_eq!(caret.pos, 5);
        assert!(caret.step_line(buffer, 1));
        assert_eq!(caret.pos, buffer.len());
    }

    #[test]
    fn line_ranges_skip_separators() {
        assert_eq!(line_ranges("a\n\nb", 10), vec![(0, 1), (2, 2), (3, 4)]);
        assert_eq!(line_ranges("hello world", 5), vec![(0, 5), (6, 11)]);
        assert_eq!(line_ranges("ab\n", 10).last(), Some(&(3, 3)));
    }

    #[test]
    fn clamp_to_boundary_backs_off_inside_a_char() {
        assert_eq!(clamp_to_boundary("é", 1), 0);
        assert_eq!(clamp_to_boundary("é", 9), 2);
    }
}
