//! Reactive pipeline.
//!
//! ```text
//! primitive call → array/slot write (marks dirty)
//!   → layoutDerived → frameBufferDerived → render effect
//! ```
//!
//! The deriveds are pure; only the render effect mutates the outside world
//! (hit grid, scroll layout, terminal bytes).

pub mod frame_buffer;
pub mod layout_derived;
pub mod mount;
pub mod terminal;

pub use frame_buffer::{create_frame_buffer_derived, FrameBufferResult, HitRegion};
pub use layout_derived::create_layout_derived;
pub use mount::{mount, MountHandle, MountOptions};
pub use terminal::{
    detect_terminal_size, disable_mouse, enable_mouse, render_mode, set_render_mode,
    set_terminal_size, terminal_height, terminal_width, MOUSE_DISABLE_SEQ, MOUSE_ENABLE_SEQ,
};
