//! Input — the byte-level escape-sequence parser.
//!
//! Raw TTY bytes come in, typed key/mouse events come out. Routing through
//! focus, the hit grid and the handler registries happens in `state::router`.

mod parser;

pub use parser::{
    encode_key, InputBuffer, KeyCode, KeyEvent, KeyPhase, Modifier, MouseButton, MouseEvent,
    MouseKind, ParsedEvent, Parser, ESC_FLUSH_TIMEOUT,
};
