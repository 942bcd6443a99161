//! Escape-sequence parser for the terminal input stream.
//!
//! A hand-written, single-pass byte state machine that demultiplexes
//! keyboard and mouse events from the interleaved stdin stream:
//!
//! - `ESC [ <` … `M|m` — SGR mouse (press/release/motion/scroll)
//! - `ESC [ M` + 3 bytes — X10 mouse
//! - `ESC [ params term` — CSI keyboard (arrows, nav, `~` codes, Kitty `u`)
//! - `ESC O c` — SS3 function keys and arrow aliases
//! - `ESC c` — Alt+char
//! - bare `ESC` — Escape (after the disambiguation timeout)
//! - control bytes and literal characters
//!
//! Incomplete sequences stay buffered; a malformed sequence advances one
//! byte and emits nothing. `InputBuffer` adds the ~10 ms timeout that turns
//! a lone ESC into an Escape key instead of waiting forever.

use std::time::{Duration, Instant};

// =============================================================================
// Event types
// =============================================================================

/// A parsed input event.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

/// Key press/repeat/release (repeat and release only from the Kitty protocol).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifier,
    pub phase: KeyPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl KeyCode {
    /// Canonical key name as used by the handler registries.
    pub fn name(&self) -> String {
        match self {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Escape => "Escape".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Up => "ArrowUp".to_string(),
            KeyCode::Down => "ArrowDown".to_string(),
            KeyCode::Left => "ArrowLeft".to_string(),
            KeyCode::Right => "ArrowRight".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::F(n) => format!("F{n}"),
        }
    }
}

bitflags::bitflags! {
    /// Keyboard modifier bits, matching the CSI encoding (param − 1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifier: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const META  = 1 << 3;
    }
}

/// Mouse event with zero-based coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Press(MouseButton),
    Release(MouseButton),
    Move,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// =============================================================================
// Parser
// =============================================================================

enum Step {
    Event(ParsedEvent),
    /// Sequence consumed but produced nothing (malformed or ignored).
    Nothing,
    /// Need more bytes.
    Incomplete,
}

/// Byte-wise input parser. Holds the unconsumed tail between feeds.
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed bytes; returns every complete event. An incomplete tail stays
    /// buffered for the next feed (or the timeout flush).
    pub fn feed(&mut self, data: &[u8]) -> Vec<ParsedEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();

        while !self.buf.is_empty() {
            match self.step() {
                Step::Event(ev) => events.push(ev),
                Step::Nothing => {}
                Step::Incomplete => break,
            }
        }

        events
    }

    /// Whether an incomplete sequence is waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush buffered bytes as literal key presses. A leading ESC becomes
    /// the Escape key — this is how a bare ESC is told apart from the start
    /// of a sequence.
    pub fn flush_pending(&mut self) -> Vec<ParsedEvent> {
        let bytes = std::mem::take(&mut self.buf);
        let mut events = Vec::new();
        for byte in bytes {
            if byte == 0x1B {
                events.push(key(KeyCode::Escape, Modifier::NONE));
            } else if let Step::Event(ev) = classify_single(byte) {
                events.push(ev);
            }
        }
        events
    }

    fn step(&mut self) -> Step {
        let first = self.buf[0];

        match first {
            0x1B => self.parse_escape(),
            0x00..=0x1F | 0x7F => {
                self.consume(1);
                classify_single(first)
            }
            0x20..=0x7E => {
                self.consume(1);
                classify_single(first)
            }
            // UTF-8 multi-byte lead.
            0x80..=0xFF => self.parse_utf8(),
        }
    }

    fn parse_escape(&mut self) -> Step {
        if self.buf.len() < 2 {
            return Step::Incomplete;
        }

        match self.buf[1] {
            b'[' => self.parse_csi(),
            b'O' => self.parse_ss3(),
            // Alt + printable.
            0x20..=0x7E => {
                let ch = self.buf[1] as char;
                self.consume(2);
                Step::Event(key(KeyCode::Char(ch), Modifier::ALT))
            }
            // ESC ESC — Alt+Escape.
            0x1B => {
                self.consume(2);
                Step::Event(key(KeyCode::Escape, Modifier::ALT))
            }
            _ => {
                // ESC followed by something unrecognized: standalone Escape.
                self.consume(1);
                Step::Event(key(KeyCode::Escape, Modifier::NONE))
            }
        }
    }

    fn parse_csi(&mut self) -> Step {
        if self.buf.len() < 3 {
            return Step::Incomplete;
        }

        if self.buf[2] == b'<' {
            return self.parse_sgr_mouse();
        }
        if self.buf[2] == b'M' {
            return self.parse_x10_mouse();
        }

        // Scan for the final byte (0x40-0x7E).
        let mut end = 2;
        while end < self.buf.len() {
            if (0x40..=0x7E).contains(&self.buf[end]) {
                break;
            }
            end += 1;
        }
        if end >= self.buf.len() {
            return Step::Incomplete;
        }

        let final_byte = self.buf[end];
        let params = parse_params(&self.buf[2..end]);
        self.consume(end + 1);

        // Kitty keyboard protocol: codepoint;modifier;event-type.
        if final_byte == b'u' {
            return kitty_key(&params);
        }

        let modifiers = params
            .get(1)
            .copied()
            .filter(|&m| m > 0)
            .map(decode_modifier)
            .unwrap_or(Modifier::NONE);

        let code = match final_byte {
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            b'P' => Some(KeyCode::F(1)),
            b'Q' => Some(KeyCode::F(2)),
            b'R' => Some(KeyCode::F(3)),
            b'S' => Some(KeyCode::F(4)),
            b'Z' => return Step::Event(key(KeyCode::Tab, Modifier::SHIFT)),
            b'~' => match params.first().copied().unwrap_or(0) {
                1 => Some(KeyCode::Home),
                2 => Some(KeyCode::Insert),
                3 => Some(KeyCode::Delete),
                4 => Some(KeyCode::End),
                5 => Some(KeyCode::PageUp),
                6 => Some(KeyCode::PageDown),
                11 => Some(KeyCode::F(1)),
                12 => Some(KeyCode::F(2)),
                13 => Some(KeyCode::F(3)),
                14 => Some(KeyCode::F(4)),
                15 => Some(KeyCode::F(5)),
                17 => Some(KeyCode::F(6)),
                18 => Some(KeyCode::F(7)),
                19 => Some(KeyCode::F(8)),
                20 => Some(KeyCode::F(9)),
                21 => Some(KeyCode::F(10)),
                23 => Some(KeyCode::F(11)),
                24 => Some(KeyCode::F(12)),
                _ => None,
            },
            _ => None,
        };

        match code {
            Some(code) => Step::Event(key(code, modifiers)),
            None => Step::Nothing,
        }
    }

    fn parse_ss3(&mut self) -> Step {
        if self.buf.len() < 3 {
            return Step::Incomplete;
        }

        let code = match self.buf[2] {
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            b'P' => Some(KeyCode::F(1)),
            b'Q' => Some(KeyCode::F(2)),
            b'R' => Some(KeyCode::F(3)),
            b'S' => Some(KeyCode::F(4)),
            _ => None,
        };
        self.consume(3);

        match code {
            Some(code) => Step::Event(key(code, Modifier::NONE)),
            None => Step::Nothing,
        }
    }

    /// `ESC [ < Cb ; Cx ; Cy (M|m)` with 1-based coordinates.
    fn parse_sgr_mouse(&mut self) -> Step {
        let start = 3;
        let mut end = start;
        while end < self.buf.len() {
            let b = self.buf[end];
            if b == b'M' || b == b'm' {
                break;
            }
            if !b.is_ascii_digit() && b != b';' {
                // Not an SGR payload after all.
                self.consume(1);
                return Step::Nothing;
            }
            end += 1;
        }
        if end >= self.buf.len() {
            return Step::Incomplete;
        }

        let is_release = self.buf[end] == b'm';
        let params = parse_params(&self.buf[start..end]);
        self.consume(end + 1);

        if params.len() < 3 {
            return Step::Nothing;
        }

        let cb = params[0];
        let x = (params[1] as u16).saturating_sub(1);
        let y = (params[2] as u16).saturating_sub(1);

        Step::Event(ParsedEvent::Mouse(decode_mouse(cb, x, y, is_release)))
    }

    /// `ESC [ M` + 3 bytes, offsets 32 (button) and 33 (coords).
    fn parse_x10_mouse(&mut self) -> Step {
        if self.buf.len() < 6 {
            return Step::Incomplete;
        }

        let cb = self.buf[3].wrapping_sub(32) as u32;
        let x = self.buf[4].wrapping_sub(33) as u16;
        let y = self.buf[5].wrapping_sub(33) as u16;
        self.consume(6);

        // X10 encodes release as base button 3.
        if cb & 0x43 == 3 {
            return Step::Event(ParsedEvent::Mouse(MouseEvent {
                kind: MouseKind::Release(MouseButton::Left),
                x,
                y,
                modifiers: decode_button_modifiers(cb),
            }));
        }

        Step::Event(ParsedEvent::Mouse(decode_mouse(cb, x, y, false)))
    }

    fn parse_utf8(&mut self) -> Step {
        let first = self.buf[0];
        let len = if first & 0xE0 == 0xC0 {
            2
        } else if first & 0xF0 == 0xE0 {
            3
        } else if first & 0xF8 == 0xF0 {
            4
        } else {
            // Stray continuation byte.
            self.consume(1);
            return Step::Nothing;
        };

        if self.buf.len() < len {
            return Step::Incomplete;
        }

        let ch = std::str::from_utf8(&self.buf[..len])
            .ok()
            .and_then(|s| s.chars().next());
        self.consume(len);

        match ch {
            Some(ch) => Step::Event(key(KeyCode::Char(ch), Modifier::NONE)),
            None => Step::Nothing,
        }
    }

    fn consume(&mut self, n: usize) {
        self.buf.drain(..n);
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Decoding helpers
// =============================================================================

fn key(code: KeyCode, modifiers: Modifier) -> ParsedEvent {
    ParsedEvent::Key(KeyEvent {
        code,
        modifiers,
        phase: KeyPhase::Press,
    })
}

/// Single control or printable byte.
fn classify_single(byte: u8) -> Step {
    match byte {
        0x08 => Step::Event(key(KeyCode::Backspace, Modifier::NONE)),
        0x09 => Step::Event(key(KeyCode::Tab, Modifier::NONE)),
        0x0A | 0x0D => Step::Event(key(KeyCode::Enter, Modifier::NONE)),
        0x1B => Step::Event(key(KeyCode::Escape, Modifier::NONE)),
        0x7F => Step::Event(key(KeyCode::Backspace, Modifier::NONE)),
        0x00 => Step::Nothing,
        0x01..=0x1A => {
            let ch = (byte - 1 + b'a') as char;
            Step::Event(key(KeyCode::Char(ch), Modifier::CTRL))
        }
        0x1C..=0x1F => Step::Nothing,
        _ => {
            let ch = byte as char;
            let modifiers = if ch.is_ascii_uppercase() {
                Modifier::SHIFT
            } else {
                Modifier::NONE
            };
            Step::Event(key(KeyCode::Char(ch), modifiers))
        }
    }
}

fn parse_params(bytes: &[u8]) -> Vec<u32> {
    String::from_utf8_lossy(bytes)
        .split(';')
        .map(|s| s.parse::<u32>().unwrap_or(0))
        .collect()
}

/// CSI modifier parameter: value − 1 is a bitmask of shift/alt/ctrl/meta.
fn decode_modifier(param: u32) -> Modifier {
    let bits = param.saturating_sub(1);
    let mut m = Modifier::NONE;
    if bits & 1 != 0 {
        m |= Modifier::SHIFT;
    }
    if bits & 2 != 0 {
        m |= Modifier::ALT;
    }
    if bits & 4 != 0 {
        m |= Modifier::CTRL;
    }
    if bits & 8 != 0 {
        m |= Modifier::META;
    }
    m
}

fn decode_button_modifiers(cb: u32) -> Modifier {
    let mut m = Modifier::NONE;
    if cb & 4 != 0 {
        m |= Modifier::SHIFT;
    }
    if cb & 8 != 0 {
        m |= Modifier::ALT;
    }
    if cb & 16 != 0 {
        m |= Modifier::CTRL;
    }
    m
}

/// Shared SGR/X10 button-code decoding.
fn decode_mouse(cb: u32, x: u16, y: u16, is_release: bool) -> MouseEvent {
    let modifiers = decode_button_modifiers(cb);
    let base = cb & 3;

    let kind = if cb & 64 != 0 {
        match base {
            0 => MouseKind::ScrollUp,
            1 => MouseKind::ScrollDown,
            2 => MouseKind::ScrollLeft,
            _ => MouseKind::ScrollRight,
        }
    } else if cb & 32 != 0 {
        MouseKind::Move
    } else {
        let button = match base {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            _ => MouseButton::Right,
        };
        if is_release {
            MouseKind::Release(button)
        } else {
            MouseKind::Press(button)
        }
    };

    MouseEvent {
        kind,
        x,
        y,
        modifiers,
    }
}

/// Kitty `u`-terminated key: `codepoint ; modifier ; event-type`.
fn kitty_key(params: &[u32]) -> Step {
    let codepoint = params.first().copied().unwrap_or(0);
    let modifiers = params
        .get(1)
        .copied()
        .filter(|&m| m > 0)
        .map(decode_modifier)
        .unwrap_or(Modifier::NONE);
    let phase = match params.get(2).copied().unwrap_or(1) {
        2 => KeyPhase::Repeat,
        3 => KeyPhase::Release,
        _ => KeyPhase::Press,
    };

    let code = match codepoint {
        9 => KeyCode::Tab,
        13 => KeyCode::Enter,
        27 => KeyCode::Escape,
        127 => KeyCode::Backspace,
        cp => match char::from_u32(cp) {
            Some(ch) => KeyCode::Char(ch),
            None => return Step::Nothing,
        },
    };

    Step::Event(ParsedEvent::Key(KeyEvent {
        code,
        modifiers,
        phase,
    }))
}

// =============================================================================
// Re-encoding (diagnostics and round-trip checks)
// =============================================================================

/// Encode a key event back into the byte sequence a terminal would send.
pub fn encode_key(event: &KeyEvent) -> Vec<u8> {
    let m = event.modifiers;
    let mod_param = 1
        + if m.contains(Modifier::SHIFT) { 1 } else { 0 }
        + if m.contains(Modifier::ALT) { 2 } else { 0 }
        + if m.contains(Modifier::CTRL) { 4 } else { 0 }
        + if m.contains(Modifier::META) { 8 } else { 0 };

    let csi = |final_byte: u8| -> Vec<u8> {
        if mod_param > 1 {
            format!("\x1b[1;{mod_param}{}", final_byte as char).into_bytes()
        } else {
            vec![0x1B, b'[', final_byte]
        }
    };
    let tilde = |code: u32| -> Vec<u8> {
        if mod_param > 1 {
            format!("\x1b[{code};{mod_param}~").into_bytes()
        } else {
            format!("\x1b[{code}~").into_bytes()
        }
    };

    match event.code {
        KeyCode::Up => csi(b'A'),
        KeyCode::Down => csi(b'B'),
        KeyCode::Right => csi(b'C'),
        KeyCode::Left => csi(b'D'),
        KeyCode::Home => csi(b'H'),
        KeyCode::End => csi(b'F'),
        KeyCode::Insert => tilde(2),
        KeyCode::Delete => tilde(3),
        KeyCode::PageUp => tilde(5),
        KeyCode::PageDown => tilde(6),
        KeyCode::F(n) => match n {
            1 => vec![0x1B, b'O', b'P'],
            2 => vec![0x1B, b'O', b'Q'],
            3 => vec![0x1B, b'O', b'R'],
            4 => vec![0x1B, b'O', b'S'],
            5 => tilde(15),
            6 => tilde(17),
            7 => tilde(18),
            8 => tilde(19),
            9 => tilde(20),
            10 => tilde(21),
            11 => tilde(23),
            _ => tilde(24),
        },
        KeyCode::Tab if m.contains(Modifier::SHIFT) => vec![0x1B, b'[', b'Z'],
        KeyCode::Tab => vec![0x09],
        KeyCode::Enter => vec![0x0D],
        KeyCode::Backspace => vec![0x7F],
        KeyCode::Escape if m.contains(Modifier::ALT) => vec![0x1B, 0x1B],
        KeyCode::Escape => vec![0x1B],
        KeyCode::Char(c) => {
            if m.contains(Modifier::CTRL) && c.is_ascii_lowercase() {
                vec![c as u8 - b'a' + 1]
            } else if m.contains(Modifier::ALT) && c.is_ascii() {
                vec![0x1B, c as u8]
            } else {
                c.to_string().into_bytes()
            }
        }
    }
}

// =============================================================================
// Timed input buffer
// =============================================================================

/// Time a lone ESC (or other partial sequence) may sit in the buffer before
/// being flushed as literal keys.
pub const ESC_FLUSH_TIMEOUT: Duration = Duration::from_millis(10);

/// Parser plus the timeout bookkeeping mount's event loop needs.
pub struct InputBuffer {
    parser: Parser,
    pending_since: Option<Instant>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            pending_since: None,
        }
    }

    pub fn feed(&mut self, data: &[u8]) -> Vec<ParsedEvent> {
        let events = self.parser.feed(data);
        self.pending_since = if self.parser.has_pending() {
            Some(self.pending_since.unwrap_or_else(Instant::now))
        } else {
            None
        };
        events
    }

    /// Flush buffered bytes as literal keys once the timeout elapsed.
    pub fn poll_timeout(&mut self) -> Vec<ParsedEvent> {
        match self.pending_since {
            Some(since) if since.elapsed() >= ESC_FLUSH_TIMEOUT => {
                self.pending_since = None;
                self.parser.flush_pending()
            }
            _ => Vec::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.parser.has_pending()
    }
}

impl Default for InputBuffer {
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

    fn parse(data: &[u8]) -> Vec<ParsedEvent> {
        Parser::new().feed(data)
    }

    #[test]
    fn test_ascii_chars() {
        let events = parse(b"abc");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], key(KeyCode::Char('a'), Modifier::NONE));
        assert_eq!(events[2], key(KeyCode::Char('c'), Modifier::NONE));
    }

    #[test]
    fn test_uppercase_sets_shift() {
        let events = parse(b"A");
        assert_eq!(events[0], key(KeyCode::Char('A'), Modifier::SHIFT));
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(parse(b"\r")[0], key(KeyCode::Enter, Modifier::NONE));
        assert_eq!(parse(b"\n")[0], key(KeyCode::Enter, Modifier::NONE));
        assert_eq!(parse(b"\t")[0], key(KeyCode::Tab, Modifier::NONE));
        assert_eq!(parse(b"\x08")[0], key(KeyCode::Backspace, Modifier::NONE));
        assert_eq!(parse(b"\x7f")[0], key(KeyCode::Backspace, Modifier::NONE));
        assert_eq!(parse(b"\x03")[0], key(KeyCode::Char('c'), Modifier::CTRL));
        assert_eq!(parse(b"\x01")[0], key(KeyCode::Char('a'), Modifier::CTRL));
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(parse(b"\x1b[A")[0], key(KeyCode::Up, Modifier::NONE));
        assert_eq!(parse(b"\x1b[B")[0], key(KeyCode::Down, Modifier::NONE));
        assert_eq!(parse(b"\x1b[C")[0], key(KeyCode::Right, Modifier::NONE));
        assert_eq!(parse(b"\x1b[D")[0], key(KeyCode::Left, Modifier::NONE));
    }

    #[test]
    fn test_csi_modifiers() {
        // ESC [ 1 ; 5 A = Ctrl+Up
        assert_eq!(parse(b"\x1b[1;5A")[0], key(KeyCode::Up, Modifier::CTRL));
        // ESC [ 1 ; 2 C = Shift+Right
        assert_eq!(parse(b"\x1b[1;2C")[0], key(KeyCode::Right, Modifier::SHIFT));
        // ESC [ 1 ; 4 D = Shift+Alt+Left
        assert_eq!(
            parse(b"\x1b[1;4D")[0],
            key(KeyCode::Left, Modifier::SHIFT | Modifier::ALT)
        );
    }

    #[test]
    fn test_navigation_tilde_codes() {
        assert_eq!(parse(b"\x1b[1~")[0], key(KeyCode::Home, Modifier::NONE));
        assert_eq!(parse(b"\x1b[2~")[0], key(KeyCode::Insert, Modifier::NONE));
        assert_eq!(parse(b"\x1b[3~")[0], key(KeyCode::Delete, Modifier::NONE));
        assert_eq!(parse(b"\x1b[4~")[0], key(KeyCode::End, Modifier::NONE));
        assert_eq!(parse(b"\x1b[5~")[0], key(KeyCode::PageUp, Modifier::NONE));
        assert_eq!(parse(b"\x1b[6~")[0], key(KeyCode::PageDown, Modifier::NONE));
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(parse(b"\x1bOP")[0], key(KeyCode::F(1), Modifier::NONE));
        assert_eq!(parse(b"\x1bOS")[0], key(KeyCode::F(4), Modifier::NONE));
        assert_eq!(parse(b"\x1b[11~")[0], key(KeyCode::F(1), Modifier::NONE));
        assert_eq!(parse(b"\x1b[15~")[0], key(KeyCode::F(5), Modifier::NONE));
        assert_eq!(parse(b"\x1b[24~")[0], key(KeyCode::F(12), Modifier::NONE));
    }

    #[test]
    fn test_shift_tab() {
        assert_eq!(parse(b"\x1b[Z")[0], key(KeyCode::Tab, Modifier::SHIFT));
    }

    #[test]
    fn test_alt_char() {
        assert_eq!(parse(b"\x1bx")[0], key(KeyCode::Char('x'), Modifier::ALT));
    }

    #[test]
    fn test_kitty_keys() {
        // codepoint 97 = 'a', press
        assert_eq!(
            parse(b"\x1b[97u")[0],
            key(KeyCode::Char('a'), Modifier::NONE)
        );
        // Enter with ctrl, release
        let ev = &parse(b"\x1b[13;5;3u")[0];
        assert_eq!(
            *ev,
            ParsedEvent::Key(KeyEvent {
                code: KeyCode::Enter,
                modifiers: Modifier::CTRL,
                phase: KeyPhase::Release,
            })
        );
        // Repeat phase
        let ev = &parse(b"\x1b[9;1;2u")[0];
        assert_eq!(
            *ev,
            ParsedEvent::Key(KeyEvent {
                code: KeyCode::Tab,
                modifiers: Modifier::NONE,
                phase: KeyPhase::Repeat,
            })
        );
    }

    #[test]
    fn test_sgr_mouse_press_release() {
        // 1-based (13, 6) becomes 0-based (12, 5).
        let events = parse(b"\x1b[<0;13;6M");
        assert_eq!(
            events[0],
            ParsedEvent::Mouse(MouseEvent {
                kind: MouseKind::Press(MouseButton::Left),
                x: 12,
                y: 5,
                modifiers: Modifier::NONE,
            })
        );

        let events = parse(b"\x1b[<0;13;6m");
        assert_eq!(
            events[0],
            ParsedEvent::Mouse(MouseEvent {
                kind: MouseKind::Release(MouseButton::Left),
                x: 12,
                y: 5,
                modifiers: Modifier::NONE,
            })
        );
    }

    #[test]
    fn test_sgr_mouse_buttons_and_mods() {
        let events = parse(b"\x1b[<2;1;1M");
        assert!(matches!(
            events[0],
            ParsedEvent::Mouse(MouseEvent {
                kind: MouseKind::Press(MouseButton::Right),
                ..
            })
        ));

        // Ctrl (bit 4) + left button
        let events = parse(b"\x1b[<16;1;1M");
        if let ParsedEvent::Mouse(m) = &events[0] {
            assert_eq!(m.modifiers, Modifier::CTRL);
        } else {
            panic!("expected mouse event");
        }
    }

    #[test]
    fn test_sgr_scroll_directions() {
        let cases: [(&[u8], MouseKind); 4] = [
            (b"\x1b[<64;5;5M", MouseKind::ScrollUp),
            (b"\x1b[<65;5;5M", MouseKind::ScrollDown),
            (b"\x1b[<66;5;5M", MouseKind::ScrollLeft),
            (b"\x1b[<67;5;5M", MouseKind::ScrollRight),
        ];
        for (bytes, kind) in cases {
            let events = parse(bytes);
            if let ParsedEvent::Mouse(m) = &events[0] {
                assert_eq!(m.kind, kind);
            } else {
                panic!("expected mouse event for {bytes:?}");
            }
        }
    }

    #[test]
    fn test_sgr_motion() {
        let events = parse(b"\x1b[<35;10;4M");
        if let ParsedEvent::Mouse(m) = &events[0] {
            assert_eq!(m.kind, MouseKind::Move);
            assert_eq!((m.x, m.y), (9, 3));
        } else {
            panic!("expected mouse event");
        }
    }

    #[test]
    fn test_x10_mouse() {
        // Cb = 32 (left press), Cx = 33 + 4, Cy = 33 + 2
        let events = parse(&[0x1B, b'[', b'M', 32, 37, 35]);
        assert_eq!(
            events[0],
            ParsedEvent::Mouse(MouseEvent {
                kind: MouseKind::Press(MouseButton::Left),
                x: 4,
                y: 2,
                modifiers: Modifier::NONE,
            })
        );

        // Cb = 35 → release
        let events = parse(&[0x1B, b'[', b'M', 35, 34, 34]);
        assert!(matches!(
            events[0],
            ParsedEvent::Mouse(MouseEvent {
                kind: MouseKind::Release(MouseButton::Left),
                ..
            })
        ));
    }

    #[test]
    fn test_incomplete_sequence_buffers() {
        let mut parser = Parser::new();
        assert!(parser.feed(b"\x1b[").is_empty());
        assert!(parser.has_pending());

        let events = parser.feed(b"A");
        assert_eq!(events[0], key(KeyCode::Up, Modifier::NONE));
        assert!(!parser.has_pending());
    }

    #[test]
    fn test_bare_escape_flush() {
        let mut parser = Parser::new();
        assert!(parser.feed(b"\x1b").is_empty());
        assert!(parser.has_pending());

        let events = parser.flush_pending();
        assert_eq!(events[0], key(KeyCode::Escape, Modifier::NONE));
        assert!(!parser.has_pending());
    }

    #[test]
    fn test_interleaved_keyboard_and_mouse() {
        let events = parse(b"a\x1b[<0;2;2Mb\x1b[B");
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], key(KeyCode::Char('a'), Modifier::NONE));
        assert!(matches!(events[1], ParsedEvent::Mouse(_)));
        assert_eq!(events[2], key(KeyCode::Char('b'), Modifier::NONE));
        assert_eq!(events[3], key(KeyCode::Down, Modifier::NONE));
    }

    #[test]
    fn test_utf8_input() {
        let events = parse("é".as_bytes());
        assert_eq!(events[0], key(KeyCode::Char('é'), Modifier::NONE));

        let events = parse("日".as_bytes());
        assert_eq!(events[0], key(KeyCode::Char('日'), Modifier::NONE));
    }

    #[test]
    fn test_malformed_advances_one_byte() {
        // A stray continuation byte is dropped; following input still parses.
        let events = parse(&[0x80, b'a']);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], key(KeyCode::Char('a'), Modifier::NONE));
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let cases = vec![
            KeyEvent {
                code: KeyCode::Up,
                modifiers: Modifier::NONE,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::Left,
                modifiers: Modifier::CTRL,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::Home,
                modifiers: Modifier::SHIFT,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::PageDown,
                modifiers: Modifier::NONE,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: Modifier::NONE,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::Char('x'),
                modifiers: Modifier::ALT,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::Tab,
                modifiers: Modifier::SHIFT,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::F(5),
                modifiers: Modifier::NONE,
                phase: KeyPhase::Press,
            },
            KeyEvent {
                code: KeyCode::Delete,
                modifiers: Modifier::NONE,
                phase: KeyPhase::Press,
            },
        ];

        for event in cases {
            let bytes = encode_key(&event);
            let parsed = parse(&bytes);
            assert_eq!(
                parsed,
                vec![ParsedEvent::Key(event.clone())],
                "round trip failed for {event:?}"
            );
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(KeyCode::Up.name(), "ArrowUp");
        assert_eq!(KeyCode::Char('a').name(), "a");
        assert_eq!(KeyCode::F(7).name(), "F7");
        assert_eq!(KeyCode::Escape.name(), "Escape");
    }
}
