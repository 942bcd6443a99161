//! # cinder-tui
//!
//! Reactive retained-mode terminal UI engine.
//!
//! Built on [spark-signals](https://crates.io/crates/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! Components are indices into columnar parallel arrays, not objects. Every
//! cell is a stable reactive slot that can be bound to signals, getters, or
//! static values; binding swaps the slot's source in place so dependents
//! stay subscribed across prop changes.
//!
//! The pipeline is derived-based end to end:
//!
//! ```text
//! Component tree → FlexNode slots → layoutDerived → frameBufferDerived → render effect
//! ```
//!
//! Input runs the other way: raw TTY bytes feed a hand-written
//! escape-sequence parser, events route through focus, the hit grid, and
//! the handler registries, and whatever state they touch reflows through
//! the same deriveds.
//!
//! ## Modules
//!
//! - [`types`] — colors, dimensions, flex enums, cells
//! - [`engine`] — registry, parallel arrays, FlexNodes
//! - [`layout`] — flex computation and text measurement
//! - [`input`] — escape-sequence parser
//! - [`state`] — keyboard/mouse/focus/scroll state and the router
//! - [`primitives`] — `box_primitive`, `text`, `input`
//! - [`pipeline`] — terminal signals, deriveds, `mount`
//! - [`renderer`] — frame buffer and ANSI output
//! - [`theme`] — reactive theme and variants

pub mod engine;
pub mod input;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod theme;
pub mod types;

pub use types::*;

pub use engine::{
    allocate_index, create_flex_node, destroy_flex_node, get_allocated_count,
    get_allocated_indices, get_current_parent_index, get_flex_node, get_id, get_index,
    is_allocated, on_destroy, pop_parent_context, push_parent_context, release_index,
    reset_registry, FlexNode,
};

pub use layout::{
    compute_layout, measure_text_height, reset_layout_cache, string_width, truncate_text,
    wrap_text, ComputedLayout,
};

pub use pipeline::{
    mount, set_render_mode, set_terminal_size, terminal_height, terminal_width,
    FrameBufferResult, HitRegion, MountHandle, MountOptions,
};

pub use primitives::{
    box_primitive, input as input_primitive, text, BoxProps, Cleanup, InputProps, PropValue,
    TextProps,
};

pub use renderer::{DiffRenderer, FrameBuffer, InlineRenderer};

pub use state::focus::{
    blur, focus, focus_first, focus_last, focus_next, focus_previous, get_focusable_indices,
    get_focused_index, has_focus, is_focused, pop_focus_trap, push_focus_trap,
    restore_focus_from_history,
};

pub use state::keyboard::{KeyboardEvent, KeyState, Modifiers};
pub use state::mouse::{HitGrid, MouseAction, MouseButton, MouseEvent, ScrollDirection};
pub use state::scroll::{
    scroll_by, scroll_by_with_chaining, scroll_into_view, set_scroll_offset, LINE_SCROLL,
    WHEEL_SCROLL,
};

pub use theme::{active_theme, set_theme, Theme, Variant, VariantStyle};

// Reactivity primitives applications need alongside the engine.
pub use spark_signals::{derived, effect, flush_sync, signal, Derived, Signal};
