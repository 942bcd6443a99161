//! Terminal state: size signals, render mode, mouse capture.
//!
//! The only module (besides the renderer) that touches the TTY. Everything
//! else reads the size through signals so a resize reflows reactively.

use std::io::{self, Write};

use spark_signals::{signal, Signal};

use crate::types::RenderMode;

// =============================================================================
// Wire sequences (mouse capture)
// =============================================================================

/// Enables button, drag, any-motion and SGR extended reporting.
pub const MOUSE_ENABLE_SEQ: &str = "\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1006h";

/// Matching disable, reverse order.
pub const MOUSE_DISABLE_SEQ: &str = "\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l";

// =============================================================================
// Signals
// =============================================================================

thread_local! {
    static TERMINAL_WIDTH: Signal<u16> = signal(80);
    static TERMINAL_HEIGHT: Signal<u16> = signal(24);
    static RENDER_MODE: Signal<RenderMode> = signal(RenderMode::Fullscreen);
}

/// Terminal width in columns (reactive).
pub fn terminal_width() -> u16 {
    TERMINAL_WIDTH.with(|s| s.get())
}

/// Terminal height in rows (reactive).
pub fn terminal_height() -> u16 {
    TERMINAL_HEIGHT.with(|s| s.get())
}

pub fn terminal_width_signal() -> Signal<u16> {
    TERMINAL_WIDTH.with(|s| s.clone())
}

pub fn terminal_height_signal() -> Signal<u16> {
    TERMINAL_HEIGHT.with(|s| s.clone())
}

/// Update the size signals (resize events, tests).
pub fn set_terminal_size(width: u16, height: u16) {
    TERMINAL_WIDTH.with(|s| s.set(width));
    TERMINAL_HEIGHT.with(|s| s.set(height));
}

/// Query the real terminal and publish its size. Falls back to 80×24 when
/// no TTY is attached.
pub fn detect_terminal_size() {
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    set_terminal_size(w, h);
}

/// Current render mode (reactive).
pub fn render_mode() -> RenderMode {
    RENDER_MODE.with(|s| s.get())
}

pub fn render_mode_signal() -> Signal<RenderMode> {
    RENDER_MODE.with(|s| s.clone())
}

pub fn set_render_mode(mode: RenderMode) {
    RENDER_MODE.with(|s| s.set(mode));
}

// =============================================================================
// Mouse capture
// =============================================================================

pub fn enable_mouse() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(MOUSE_ENABLE_SEQ.as_bytes())?;
    out.flush()
}

pub fn disable_mouse() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(MOUSE_DISABLE_SEQ.as_bytes())?;
    out.flush()
}
