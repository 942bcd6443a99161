//! Core arrays: component kind, parent link, visibility, id.
//!
//! `kind` is a plain column (never reactive); the rest are tracked slots
//! publishing to the hierarchy dirty set.

use std::cell::RefCell;

use spark_signals::{tracked_slot_array, Signal, TrackedSlotArray};

use super::dirty::HIERARCHY_DIRTY;
use crate::types::ComponentKind;

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    /// Component kind. Plain storage: layout and dispatch read it constantly
    /// and it only changes on allocate/release.
    static KIND: RefCell<Vec<ComponentKind>> = RefCell::new(Vec::new());

    /// Parent component index (None for mount roots).
    static PARENT: TrackedSlotArray<Option<usize>> = tracked_slot_array(
        Some(None),
        HIERARCHY_DIRTY.with(|s| s.clone())
    );

    /// Visibility flag. Invisible components are skipped by layout and paint.
    static VISIBLE: TrackedSlotArray<bool> = tracked_slot_array(
        Some(true),
        HIERARCHY_DIRTY.with(|s| s.clone())
    );

    /// Component id string (diagnostics, focus history validation).
    static ID: TrackedSlotArray<String> = tracked_slot_array(
        Some(String::new()),
        HIERARCHY_DIRTY.with(|s| s.clone())
    );
}

// =============================================================================
// Capacity management
// =============================================================================

/// Ensure all core columns cover `index`.
pub fn ensure_capacity(index: usize) {
    KIND.with(|arr| {
        let mut arr = arr.borrow_mut();
        while arr.len() <= index {
            arr.push(ComponentKind::None);
        }
    });
    PARENT.with(|arr| arr.ensure_capacity(index + 1));
    VISIBLE.with(|arr| arr.ensure_capacity(index + 1));
    ID.with(|arr| arr.ensure_capacity(index + 1));
}

/// Reset the columns at `index` to defaults (component released).
pub fn clear_at_index(index: usize) {
    KIND.with(|arr| {
        let mut arr = arr.borrow_mut();
        if index < arr.len() {
            arr[index] = ComponentKind::None;
        }
    });
    PARENT.with(|arr| arr.clear(index));
    VISIBLE.with(|arr| arr.clear(index));
    ID.with(|arr| arr.clear(index));
}

/// Blanket reset of every core column.
pub fn reset() {
    KIND.with(|arr| arr.borrow_mut().clear());
    PARENT.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
    VISIBLE.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
    ID.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
}

// =============================================================================
// Kind
// =============================================================================

pub fn get_kind(index: usize) -> ComponentKind {
    KIND.with(|arr| {
        arr.borrow()
            .get(index)
            .copied()
            .unwrap_or(ComponentKind::None)
    })
}

pub fn set_kind(index: usize, value: ComponentKind) {
    KIND.with(|arr| {
        let mut arr = arr.borrow_mut();
        while arr.len() <= index {
            arr.push(ComponentKind::None);
        }
        arr[index] = value;
    });
}

// =============================================================================
// Parent
// =============================================================================

/// Parent index (reactive read).
pub fn get_parent(index: usize) -> Option<usize> {
    PARENT.with(|arr| arr.get(index)).flatten()
}

pub fn set_parent(index: usize, parent: Option<usize>) {
    PARENT.with(|arr| arr.set_value(index, parent));
}

// =============================================================================
// Visible
// =============================================================================

/// Visibility (reactive read). Defaults to true.
pub fn get_visible(index: usize) -> bool {
    VISIBLE.with(|arr| arr.get(index)).unwrap_or(true)
}

pub fn set_visible(index: usize, visible: bool) {
    VISIBLE.with(|arr| arr.set_value(index, visible));
}

pub fn set_visible_signal(index: usize, sig: &Signal<bool>) {
    VISIBLE.with(|arr| arr.set_signal(index, sig));
}

pub fn set_visible_getter<F>(index: usize, getter: F)
where
    F: Fn() -> bool + 'static,
{
    VISIBLE.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Id
// =============================================================================

pub fn get_id(index: usize) -> String {
    ID.with(|arr| arr.get(index)).unwrap_or_default()
}

pub fn set_id(index: usize, id: String) {
    ID.with(|arr| arr.set_value(index, id));
}
