//! Parallel arrays — all component state lives here.
//!
//! Each array index corresponds to one component. Components write through
//! the accessor functions; deriveds read reactively via the same accessors.
//!
//! Namespaces:
//! - **core**: kind, parent, visibility, id
//! - **text**: content and text styling
//! - **visual**: colors, borders, opacity, z-index
//! - **interaction**: focus, scroll, mouse, cursor state
//!
//! Layout columns are held per-component on `FlexNode` (see `engine::flex_node`),
//! which shares the layout dirty set defined in [`dirty`].

pub mod core;
pub mod dirty;
pub mod interaction;
pub mod text;
pub mod visual;

/// Ensure every namespace covers `index`. Called by the registry on allocate.
pub fn ensure_all_capacity(index: usize) {
    core::ensure_capacity(index);
    text::ensure_capacity(index);
    visual::ensure_capacity(index);
    interaction::ensure_capacity(index);
}

/// Reset every column at `index` to defaults. Called by the registry on release.
pub fn clear_all_at_index(index: usize) {
    core::clear_at_index(index);
    text::clear_at_index(index);
    visual::clear_at_index(index);
    interaction::clear_at_index(index);
}

/// Blanket reset of every column.
///
/// Fires automatically when the allocated count drops to zero (the
/// reset-on-zero rule) so idle applications return to a clean heap.
pub fn reset_all_arrays() {
    core::reset();
    text::reset();
    visual::reset();
    interaction::reset();
    dirty::clear_all_dirty();
}
