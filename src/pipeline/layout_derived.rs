//! Reactive layout computation.
//!
//! The derived re-runs when the terminal size, render mode, any FlexNode
//! slot, text content, or the allocated set changes — every one of those is
//! a tracked read inside `compute_layout`.

use spark_signals::{derived, Derived};

use crate::layout::{compute_layout, ComputedLayout};
use crate::types::RenderMode;

use super::terminal::{render_mode_signal, terminal_height_signal, terminal_width_signal};

/// Create the layout derived. Reading it computes lazily; layout only
/// actually recomputes when an input changed.
pub fn create_layout_derived() -> Derived<ComputedLayout> {
    let width = terminal_width_signal();
    let height = terminal_height_signal();
    let mode = render_mode_signal();

    derived(move || {
        let w = width.get();
        let h = height.get();
        // Fullscreen pins roots to the viewport; inline sizes to content.
        let constrain_height = mode.get() == RenderMode::Fullscreen;
        compute_layout(w, h, constrain_height)
    })
}
