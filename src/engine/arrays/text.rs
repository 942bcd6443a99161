//! Text arrays: content, attributes, alignment, wrap mode, ellipsis glyph.
//!
//! All columns publish to the text dirty set; content changes force a
//! re-measure in the layout engine.

use spark_signals::{tracked_slot_array, Signal, TrackedSlotArray};

use super::dirty::TEXT_DIRTY;
use crate::types::{Attr, TextAlign, TextWrap};

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    static CONTENT: TrackedSlotArray<String> = tracked_slot_array(
        Some(String::new()),
        TEXT_DIRTY.with(|s| s.clone())
    );

    static ATTRS: TrackedSlotArray<Attr> = tracked_slot_array(
        Some(Attr::NONE),
        TEXT_DIRTY.with(|s| s.clone())
    );

    static ALIGN: TrackedSlotArray<TextAlign> = tracked_slot_array(
        Some(TextAlign::Left),
        TEXT_DIRTY.with(|s| s.clone())
    );

    static WRAP: TrackedSlotArray<TextWrap> = tracked_slot_array(
        Some(TextWrap::Wrap),
        TEXT_DIRTY.with(|s| s.clone())
    );

    /// Glyph appended when truncation clips content.
    static ELLIPSIS: TrackedSlotArray<String> = tracked_slot_array(
        Some("…".to_string()),
        TEXT_DIRTY.with(|s| s.clone())
    );
}

// =============================================================================
// Capacity management
// =============================================================================

pub fn ensure_capacity(index: usize) {
    CONTENT.with(|arr| arr.ensure_capacity(index + 1));
    ATTRS.with(|arr| arr.ensure_capacity(index + 1));
    ALIGN.with(|arr| arr.ensure_capacity(index + 1));
    WRAP.with(|arr| arr.ensure_capacity(index + 1));
    ELLIPSIS.with(|arr| arr.ensure_capacity(index + 1));
}

pub fn clear_at_index(index: usize) {
    CONTENT.with(|arr| arr.clear(index));
    ATTRS.with(|arr| arr.clear(index));
    ALIGN.with(|arr| arr.clear(index));
    WRAP.with(|arr| arr.clear(index));
    ELLIPSIS.with(|arr| arr.clear(index));
}

pub fn reset() {
    CONTENT.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
    ATTRS.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
    ALIGN.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
    WRAP.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
    ELLIPSIS.with(|arr| {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    });
}

// =============================================================================
// Content
// =============================================================================

/// Text content (reactive read).
pub fn get_content(index: usize) -> String {
    CONTENT.with(|arr| arr.get(index)).unwrap_or_default()
}

pub fn set_content(index: usize, content: String) {
    CONTENT.with(|arr| arr.set_value(index, content));
}

pub fn set_content_signal(index: usize, sig: &Signal<String>) {
    CONTENT.with(|arr| arr.set_signal(index, sig));
}

pub fn set_content_getter<F>(index: usize, getter: F)
where
    F: Fn() -> String + 'static,
{
    CONTENT.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Attributes
// =============================================================================

pub fn get_attrs(index: usize) -> Attr {
    ATTRS.with(|arr| arr.get(index)).unwrap_or(Attr::NONE)
}

pub fn set_attrs(index: usize, attrs: Attr) {
    ATTRS.with(|arr| arr.set_value(index, attrs));
}

pub fn set_attrs_getter<F>(index: usize, getter: F)
where
    F: Fn() -> Attr + 'static,
{
    ATTRS.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Align
// =============================================================================

pub fn get_align(index: usize) -> TextAlign {
    ALIGN.with(|arr| arr.get(index)).unwrap_or(TextAlign::Left)
}

pub fn set_align(index: usize, align: TextAlign) {
    ALIGN.with(|arr| arr.set_value(index, align));
}

pub fn set_align_getter<F>(index: usize, getter: F)
where
    F: Fn() -> TextAlign + 'static,
{
    ALIGN.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Wrap
// =============================================================================

pub fn get_wrap(index: usize) -> TextWrap {
    WRAP.with(|arr| arr.get(index)).unwrap_or(TextWrap::Wrap)
}

pub fn set_wrap(index: usize, wrap: TextWrap) {
    WRAP.with(|arr| arr.set_value(index, wrap));
}

pub fn set_wrap_getter<F>(index: usize, getter: F)
where
    F: Fn() -> TextWrap + 'static,
{
    WRAP.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Ellipsis
// =============================================================================

pub fn get_ellipsis(index: usize) -> String {
    ELLIPSIS
        .with(|arr| arr.get(index))
        .unwrap_or_else(|| "…".to_string())
}

pub fn set_ellipsis(index: usize, glyph: String) {
    ELLIPSIS.with(|arr| arr.set_value(index, glyph));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset();
    }

    #[test]
    fn test_content() {
        setup();

        assert_eq!(get_content(0), "");
        set_content(0, "Hello".to_string());
        assert_eq!(get_content(0), "Hello");
    }

    #[test]
    fn test_attrs() {
        setup();

        assert_eq!(get_attrs(0), Attr::NONE);
        set_attrs(0, Attr::BOLD | Attr::UNDERLINE);
        assert_eq!(get_attrs(0), Attr::BOLD | Attr::UNDERLINE);
    }

    #[test]
    fn test_align_wrap_defaults() {
        setup();

        assert_eq!(get_align(0), TextAlign::Left);
        assert_eq!(get_wrap(0), TextWrap::Wrap);

        set_align(0, TextAlign::Right);
        set_wrap(0, TextWrap::Truncate);
        assert_eq!(get_align(0), TextAlign::Right);
        assert_eq!(get_wrap(0), TextWrap::Truncate);
    }

    #[test]
    fn test_ellipsis_default() {
        setup();

        assert_eq!(get_ellipsis(0), "…");
        set_ellipsis(0, "+".to_string());
        assert_eq!(get_ellipsis(0), "+");
    }

    #[test]
    fn test_content_marks_dirty() {
        setup();
        super::super::dirty::clear_all_dirty();

        set_content(4, "x".to_string());
        let dirty = super::super::dirty::text_dirty();
        assert!(dirty.borrow().contains(&4));
        super::super::dirty::clear_all_dirty();
    }
}
