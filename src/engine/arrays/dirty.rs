//! Per-namespace dirty sets.
//!
//! Every mutation of a tracked column adds the component index to the
//! namespace's set. The layout engine consumes hierarchy/layout/text to
//! decide whether a frame can reuse the cached geometry; the frame buffer
//! consumes visual/scroll. Consumers clear what they consume.

use spark_signals::{dirty_set, DirtySet};

thread_local! {
    /// Hierarchy columns: parent, visibility, id.
    pub static HIERARCHY_DIRTY: DirtySet = dirty_set();

    /// Layout columns: every FlexNode slot.
    pub static LAYOUT_DIRTY: DirtySet = dirty_set();

    /// Text columns: content, attrs, align, wrap, ellipsis.
    pub static TEXT_DIRTY: DirtySet = dirty_set();

    /// Visual columns: colors, borders, opacity, z-index, hover/press state.
    pub static VISUAL_DIRTY: DirtySet = dirty_set();

    /// Scroll offsets.
    pub static SCROLL_DIRTY: DirtySet = dirty_set();
}

/// Clone handle to the hierarchy dirty set.
pub fn hierarchy_dirty() -> DirtySet {
    HIERARCHY_DIRTY.with(|s| s.clone())
}

/// Clone handle to the layout dirty set.
pub fn layout_dirty() -> DirtySet {
    LAYOUT_DIRTY.with(|s| s.clone())
}

/// Clone handle to the text dirty set.
pub fn text_dirty() -> DirtySet {
    TEXT_DIRTY.with(|s| s.clone())
}

/// Clone handle to the visual dirty set.
pub fn visual_dirty() -> DirtySet {
    VISUAL_DIRTY.with(|s| s.clone())
}

/// Clone handle to the scroll dirty set.
pub fn scroll_dirty() -> DirtySet {
    SCROLL_DIRTY.with(|s| s.clone())
}

/// True when none of the layout-affecting sets contain an index.
pub fn layout_inputs_clean() -> bool {
    HIERARCHY_DIRTY.with(|s| s.borrow().is_empty())
        && LAYOUT_DIRTY.with(|s| s.borrow().is_empty())
        && TEXT_DIRTY.with(|s| s.borrow().is_empty())
}

/// Clear the layout-affecting sets (called after a layout pass consumed them).
pub fn clear_layout_inputs() {
    HIERARCHY_DIRTY.with(|s| s.borrow_mut().clear());
    LAYOUT_DIRTY.with(|s| s.borrow_mut().clear());
    TEXT_DIRTY.with(|s| s.borrow_mut().clear());
}

/// Clear every dirty set (end of frame).
pub fn clear_all_dirty() {
    clear_layout_inputs();
    VISUAL_DIRTY.with(|s| s.borrow_mut().clear());
    SCROLL_DIRTY.with(|s| s.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_inputs_clean() {
        clear_all_dirty();
        assert!(layout_inputs_clean());

        LAYOUT_DIRTY.with(|s| s.borrow_mut().insert(3));
        assert!(!layout_inputs_clean());

        clear_layout_inputs();
        assert!(layout_inputs_clean());
    }

    #[test]
    fn test_visual_does_not_block_layout() {
        clear_all_dirty();
        VISUAL_DIRTY.with(|s| s.borrow_mut().insert(1));
        SCROLL_DIRTY.with(|s| s.borrow_mut().insert(1));
        assert!(layout_inputs_clean());
        clear_all_dirty();
    }
}
