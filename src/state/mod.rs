//! Interaction state: keyboard, mouse, focus, scroll, and the central
//! router that holds the dispatch order together.

pub mod focus;
pub mod keyboard;
pub mod mouse;
pub mod router;
pub mod scroll;
