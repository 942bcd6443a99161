//! Renderer — cell buffer and ANSI output.
//!
//! The frame buffer is the boundary between the engine and the terminal:
//! the pipeline computes cells, the renderer diffs rows and emits minimal
//! ANSI. Fullscreen mode owns the alternate screen; inline mode repaints in
//! place below the shell prompt.

use std::io::{self, Write};

use crate::types::{Attr, Cell, Rgba};

// =============================================================================
// Frame buffer
// =============================================================================

/// A width × height grid of terminal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn idx(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(&self.cells[self.idx(x, y)])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.idx(x, y);
        self.cells[i] = cell;
    }

    /// Write a character, keeping the cell's background when `bg` is
    /// transparent.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, fg: Rgba, bg: Rgba, attrs: Attr) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.idx(x, y);
        let old_bg = self.cells[i].bg;
        self.cells[i] = Cell {
            char: ch as u32,
            fg,
            bg: if bg.is_transparent() { old_bg } else { bg },
            attrs,
        };
    }

    /// Fill a rectangle with a background color (clipped).
    pub fn fill_bg(&mut self, x: u16, y: u16, w: u16, h: u16, bg: Rgba) {
        for dy in 0..h {
            let cy = y + dy;
            if cy >= self.height {
                break;
            }
            for dx in 0..w {
                let cx = x + dx;
                if cx >= self.width {
                    break;
                }
                let i = self.idx(cx, cy);
                let cell = &mut self.cells[i];
                cell.char = b' ' as u32;
                cell.bg = Rgba::blend(bg, cell.bg);
                cell.attrs = Attr::NONE;
            }
        }
    }

    pub fn row(&self, y: u16) -> &[Cell] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }
}

// =============================================================================
// ANSI encoding
// =============================================================================

fn push_color(out: &mut String, color: Rgba, foreground: bool) {
    let base = if foreground { 38 } else { 48 };
    if color.is_terminal_default() {
        out.push_str(&format!("\x1b[{}m", if foreground { 39 } else { 49 }));
    } else if color.is_ansi() {
        out.push_str(&format!("\x1b[{};5;{}m", base, color.ansi_index()));
    } else {
        out.push_str(&format!(
            "\x1b[{};2;{};{};{}m",
            base, color.r, color.g, color.b
        ));
    }
}

fn push_attrs(out: &mut String, attrs: Attr) {
    const MAP: [(Attr, u8); 8] = [
        (Attr::BOLD, 1),
        (Attr::DIM, 2),
        (Attr::ITALIC, 3),
        (Attr::UNDERLINE, 4),
        (Attr::BLINK, 5),
        (Attr::INVERSE, 7),
        (Attr::HIDDEN, 8),
        (Attr::STRIKETHROUGH, 9),
    ];
    for (attr, code) in MAP {
        if attrs.contains(attr) {
            out.push_str(&format!("\x1b[{code}m"));
        }
    }
}

/// Encode one row as ANSI, reusing pen state between adjacent cells.
fn encode_row(out: &mut String, row: &[Cell], y: u16) {
    out.push_str(&format!("\x1b[{};1H", y + 1));

    let mut pen: Option<(Rgba, Rgba, Attr)> = None;
    for cell in row {
        let state = (cell.fg, cell.bg, cell.attrs);
        if pen != Some(state) {
            out.push_str("\x1b[0m");
            push_color(out, cell.fg, true);
            push_color(out, cell.bg, false);
            push_attrs(out, cell.attrs);
            pen = Some(state);
        }
        match char::from_u32(cell.char) {
            Some(ch) if !ch.is_control() => out.push(ch),
            _ => out.push(' '),
        }
    }
    out.push_str("\x1b[0m");
}

// =============================================================================
// Diff renderer (fullscreen)
// =============================================================================

/// Switch to the alternate screen with raw mode and a hidden cursor.
pub fn enter_alt_screen() -> io::Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    out.write_all(b"\x1b[?1049h\x1b[2J\x1b[?25l")?;
    out.flush()
}

/// Restore the main screen, cursor, and cooked mode.
pub fn leave_alt_screen() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(b"\x1b[?25h\x1b[?1049l")?;
    out.flush()?;
    crossterm::terminal::disable_raw_mode()
}

/// Renders to the alternate screen, re-emitting only rows that changed.
pub struct DiffRenderer {
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self { previous: None }
    }

    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        enter_alt_screen()
    }

    pub fn leave_fullscreen(&mut self) -> io::Result<()> {
        leave_alt_screen()
    }

    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        let mut out = String::new();

        let full_redraw = match &self.previous {
            Some(prev) => prev.width() != buffer.width() || prev.height() != buffer.height(),
            None => true,
        };
        if full_redraw {
            out.push_str("\x1b[2J");
        }

        for y in 0..buffer.height() {
            let row_changed = full_redraw
                || self
                    .previous
                    .as_ref()
                    .map(|prev| prev.row(y) != buffer.row(y))
                    .unwrap_or(true);
            if row_changed {
                encode_row(&mut out, buffer.row(y), y);
            }
        }

        if !out.is_empty() {
            let mut stdout = io::stdout();
            stdout.write_all(out.as_bytes())?;
            stdout.flush()?;
        }

        self.previous = Some(buffer.clone());
        Ok(())
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Inline renderer
// =============================================================================

/// Renders below the prompt, moving the cursor back up between frames.
pub struct InlineRenderer {
    last_height: u16,
}

impl InlineRenderer {
    pub fn new() -> Self {
        Self { last_height: 0 }
    }

    pub fn render(&mut self, buffer: &FrameBuffer, content_height: u16) -> io::Result<()> {
        let rows = content_height.min(buffer.height());
        let mut out = String::new();

        if self.last_height > 0 {
            out.push_str(&format!("\x1b[{}A\r", self.last_height));
        }

        for y in 0..rows {
            out.push_str("\x1b[2K");
            let mut pen: Option<(Rgba, Rgba, Attr)> = None;
            for cell in buffer.row(y) {
                let state = (cell.fg, cell.bg, cell.attrs);
                if pen != Some(state) {
                    out.push_str("\x1b[0m");
                    push_color(&mut out, cell.fg, true);
                    push_color(&mut out, cell.bg, false);
                    push_attrs(&mut out, cell.attrs);
                    pen = Some(state);
                }
                match char::from_u32(cell.char) {
                    Some(ch) if !ch.is_control() => out.push(ch),
                    _ => out.push(' '),
                }
            }
            out.push_str("\x1b[0m\r\n");
        }

        let mut stdout = io::stdout();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;

        self.last_height = rows;
        Ok(())
    }
}

impl Default for InlineRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_defaults() {
        let fb = FrameBuffer::new(10, 4);
        assert_eq!(fb.width(), 10);
        assert_eq!(fb.height(), 4);
        assert_eq!(fb.get(3, 3), Some(&Cell::default()));
        assert_eq!(fb.get(10, 0), None);
    }

    #[test]
    fn test_put_char_and_fill() {
        let mut fb = FrameBuffer::new(10, 4);
        fb.fill_bg(0, 0, 10, 4, Rgba::rgb(1, 2, 3));
        fb.put_char(2, 1, 'x', Rgba::WHITE, Rgba::TRANSPARENT, Attr::BOLD);

        let cell = fb.get(2, 1).unwrap();
        assert_eq!(cell.char, 'x' as u32);
        // Transparent char bg keeps the fill.
        assert_eq!(cell.bg, Rgba::rgb(1, 2, 3));
        assert!(cell.attrs.contains(Attr::BOLD));
    }

    #[test]
    fn test_out_of_bounds_writes_ignored() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.put_char(9, 9, 'x', Rgba::WHITE, Rgba::TRANSPARENT, Attr::NONE);
        fb.fill_bg(3, 3, 10, 10, Rgba::rgb(5, 5, 5));
        assert_eq!(fb.get(3, 3).unwrap().bg, Rgba::rgb(5, 5, 5));
    }

    #[test]
    fn test_encode_row_emits_colors_once_per_run() {
        let mut fb = FrameBuffer::new(4, 1);
        for x in 0..4 {
            fb.put_char(x, 0, 'a', Rgba::rgb(255, 0, 0), Rgba::TRANSPARENT, Attr::NONE);
        }

        let mut out = String::new();
        encode_row(&mut out, fb.row(0), 0);

        // One pen change for the whole run of identical cells.
        assert_eq!(out.matches("38;2;255;0;0").count(), 1);
        assert_eq!(out.matches('a').count(), 4);
    }
}
