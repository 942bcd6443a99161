//! Interaction arrays: focus membership, scroll offsets, hover/press state,
//! input cursor and selection.
//!
//! Scroll offsets publish to the scroll dirty set; the remaining columns are
//! visual-affecting only.

use spark_signals::{tracked_slot_array, TrackedSlotArray};

use super::dirty::{SCROLL_DIRTY, VISUAL_DIRTY};

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    static FOCUSABLE: TrackedSlotArray<bool> = tracked_slot_array(
        Some(false),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    /// Tab order; negative excludes from the focus ring.
    static TAB_INDEX: TrackedSlotArray<i32> = tracked_slot_array(
        Some(0),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static SCROLL_OFFSET_X: TrackedSlotArray<u16> = tracked_slot_array(
        Some(0),
        SCROLL_DIRTY.with(|s| s.clone())
    );

    static SCROLL_OFFSET_Y: TrackedSlotArray<u16> = tracked_slot_array(
        Some(0),
        SCROLL_DIRTY.with(|s| s.clone())
    );

    static HOVERED: TrackedSlotArray<bool> = tracked_slot_array(
        Some(false),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static PRESSED: TrackedSlotArray<bool> = tracked_slot_array(
        Some(false),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static MOUSE_ENABLED: TrackedSlotArray<bool> = tracked_slot_array(
        Some(true),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    /// Input caret position in characters.
    static CURSOR_POSITION: TrackedSlotArray<u16> = tracked_slot_array(
        Some(0),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static SELECTION_START: TrackedSlotArray<u16> = tracked_slot_array(
        Some(0),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static SELECTION_END: TrackedSlotArray<u16> = tracked_slot_array(
        Some(0),
        VISUAL_DIRTY.with(|s| s.clone())
    );
}

// =============================================================================
// Capacity management
// =============================================================================

pub fn ensure_capacity(index: usize) {
    FOCUSABLE.with(|arr| arr.ensure_capacity(index + 1));
    TAB_INDEX.with(|arr| arr.ensure_capacity(index + 1));
    SCROLL_OFFSET_X.with(|arr| arr.ensure_capacity(index + 1));
    SCROLL_OFFSET_Y.with(|arr| arr.ensure_capacity(index + 1));
    HOVERED.with(|arr| arr.ensure_capacity(index + 1));
    PRESSED.with(|arr| arr.ensure_capacity(index + 1));
    MOUSE_ENABLED.with(|arr| arr.ensure_capacity(index + 1));
    CURSOR_POSITION.with(|arr| arr.ensure_capacity(index + 1));
    SELECTION_START.with(|arr| arr.ensure_capacity(index + 1));
    SELECTION_END.with(|arr| arr.ensure_capacity(index + 1));
}

pub fn clear_at_index(index: usize) {
    FOCUSABLE.with(|arr| arr.clear(index));
    TAB_INDEX.with(|arr| arr.clear(index));
    SCROLL_OFFSET_X.with(|arr| arr.clear(index));
    SCROLL_OFFSET_Y.with(|arr| arr.clear(index));
    HOVERED.with(|arr| arr.clear(index));
    PRESSED.with(|arr| arr.clear(index));
    MOUSE_ENABLED.with(|arr| arr.clear(index));
    CURSOR_POSITION.with(|arr| arr.clear(index));
    SELECTION_START.with(|arr| arr.clear(index));
    SELECTION_END.with(|arr| arr.clear(index));
}

pub fn reset() {
    fn wipe<T: Clone + PartialEq + 'static>(arr: &TrackedSlotArray<T>) {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    }
    FOCUSABLE.with(|arr| wipe(arr));
    TAB_INDEX.with(|arr| wipe(arr));
    SCROLL_OFFSET_X.with(|arr| wipe(arr));
    SCROLL_OFFSET_Y.with(|arr| wipe(arr));
    HOVERED.with(|arr| wipe(arr));
    PRESSED.with(|arr| wipe(arr));
    MOUSE_ENABLED.with(|arr| wipe(arr));
    CURSOR_POSITION.with(|arr| wipe(arr));
    SELECTION_START.with(|arr| wipe(arr));
    SELECTION_END.with(|arr| wipe(arr));
}

// =============================================================================
// Focus membership
// =============================================================================

pub fn get_focusable(index: usize) -> bool {
    FOCUSABLE.with(|arr| arr.get(index)).unwrap_or(false)
}

pub fn set_focusable(index: usize, focusable: bool) {
    FOCUSABLE.with(|arr| arr.set_value(index, focusable));
}

pub fn get_tab_index(index: usize) -> i32 {
    TAB_INDEX.with(|arr| arr.get(index)).unwrap_or(0)
}

pub fn set_tab_index(index: usize, tab_index: i32) {
    TAB_INDEX.with(|arr| arr.set_value(index, tab_index));
}

// =============================================================================
// Scroll offsets
// =============================================================================

pub fn get_scroll_offset_x(index: usize) -> u16 {
    SCROLL_OFFSET_X.with(|arr| arr.get(index)).unwrap_or(0)
}

pub fn get_scroll_offset_y(index: usize) -> u16 {
    SCROLL_OFFSET_Y.with(|arr| arr.get(index)).unwrap_or(0)
}

pub fn set_scroll_offset(index: usize, x: u16, y: u16) {
    SCROLL_OFFSET_X.with(|arr| arr.set_value(index, x));
    SCROLL_OFFSET_Y.with(|arr| arr.set_value(index, y));
}

// =============================================================================
// Hover / press
// =============================================================================

pub fn get_hovered(index: usize) -> bool {
    HOVERED.with(|arr| arr.get(index)).unwrap_or(false)
}

pub fn set_hovered(index: usize, hovered: bool) {
    HOVERED.with(|arr| arr.set_value(index, hovered));
}

pub fn get_pressed(index: usize) -> bool {
    PRESSED.with(|arr| arr.get(index)).unwrap_or(false)
}

pub fn set_pressed(index: usize, pressed: bool) {
    PRESSED.with(|arr| arr.set_value(index, pressed));
}

pub fn get_mouse_enabled(index: usize) -> bool {
    MOUSE_ENABLED.with(|arr| arr.get(index)).unwrap_or(true)
}

pub fn set_mouse_enabled(index: usize, enabled: bool) {
    MOUSE_ENABLED.with(|arr| arr.set_value(index, enabled));
}

// =============================================================================
// Cursor / selection
// =============================================================================

pub fn get_cursor_position(index: usize) -> u16 {
    CURSOR_POSITION.with(|arr| arr.get(index)).unwrap_or(0)
}

pub fn set_cursor_position(index: usize, pos: u16) {
    CURSOR_POSITION.with(|arr| arr.set_value(index, pos));
}

pub fn set_cursor_position_getter<F>(index: usize, getter: F)
where
    F: Fn() -> u16 + 'static,
{
    CURSOR_POSITION.with(|arr| arr.set_getter(index, getter));
}

pub fn get_selection(index: usize) -> (u16, u16) {
    (
        SELECTION_START.with(|arr| arr.get(index)).unwrap_or(0),
        SELECTION_END.with(|arr| arr.get(index)).unwrap_or(0),
    )
}

pub fn set_selection(index: usize, start: u16, end: u16) {
    SELECTION_START.with(|arr| arr.set_value(index, start));
    SELECTION_END.with(|arr| arr.set_value(index, end));
}

pub fn clear_selection(index: usize) {
    set_selection(index, 0, 0);
}

pub fn has_selection(index: usize) -> bool {
    let (start, end) = get_selection(index);
    start != end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset();
    }

    #[test]
    fn test_focusable() {
        setup();

        assert!(!get_focusable(0));
        set_focusable(0, true);
        assert!(get_focusable(0));
    }

    #[test]
    fn test_scroll_offsets() {
        setup();

        assert_eq!(get_scroll_offset_x(0), 0);
        assert_eq!(get_scroll_offset_y(0), 0);

        set_scroll_offset(0, 10, 20);
        assert_eq!(get_scroll_offset_x(0), 10);
        assert_eq!(get_scroll_offset_y(0), 20);
    }

    #[test]
    fn test_hover_press() {
        setup();

        set_hovered(0, true);
        set_pressed(0, true);
        assert!(get_hovered(0));
        assert!(get_pressed(0));

        clear_at_index(0);
        assert!(!get_hovered(0));
        assert!(!get_pressed(0));
    }

    #[test]
    fn test_selection() {
        setup();

        assert!(!has_selection(0));
        set_selection(0, 2, 5);
        assert!(has_selection(0));
        assert_eq!(get_selection(0), (2, 5));

        clear_selection(0);
        assert!(!has_selection(0));
    }

    #[test]
    fn test_scroll_marks_scroll_dirty() {
        setup();
        super::super::dirty::clear_all_dirty();

        set_scroll_offset(7, 1, 2);
        let dirty = super::super::dirty::scroll_dirty();
        assert!(dirty.borrow().contains(&7));
        super::super::dirty::clear_all_dirty();
    }
}
