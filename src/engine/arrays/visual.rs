//! Visual arrays: colors, opacity, border style/color, z-index.
//!
//! Visual-only changes never trigger re-layout; these columns publish to the
//! visual dirty set, which only the frame buffer consumes.

use spark_signals::{tracked_slot_array, TrackedSlotArray};

use super::dirty::VISUAL_DIRTY;
use crate::types::{BorderStyle, Rgba};

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    static FG: TrackedSlotArray<Rgba> = tracked_slot_array(
        Some(Rgba::TERMINAL_DEFAULT),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static BG: TrackedSlotArray<Rgba> = tracked_slot_array(
        Some(Rgba::TERMINAL_DEFAULT),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    /// 0-255, 255 fully opaque.
    static OPACITY: TrackedSlotArray<u8> = tracked_slot_array(
        Some(255),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static BORDER_STYLE: TrackedSlotArray<BorderStyle> = tracked_slot_array(
        Some(BorderStyle::None),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static BORDER_COLOR: TrackedSlotArray<Rgba> = tracked_slot_array(
        Some(Rgba::TERMINAL_DEFAULT),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    // Per-side overrides of the main border style.
    static BORDER_TOP_STYLE: TrackedSlotArray<BorderStyle> = tracked_slot_array(
        Some(BorderStyle::None),
        VISUAL_DIRTY.with(|s| s.clone())
    );
    static BORDER_RIGHT_STYLE: TrackedSlotArray<BorderStyle> = tracked_slot_array(
        Some(BorderStyle::None),
        VISUAL_DIRTY.with(|s| s.clone())
    );
    static BORDER_BOTTOM_STYLE: TrackedSlotArray<BorderStyle> = tracked_slot_array(
        Some(BorderStyle::None),
        VISUAL_DIRTY.with(|s| s.clone())
    );
    static BORDER_LEFT_STYLE: TrackedSlotArray<BorderStyle> = tracked_slot_array(
        Some(BorderStyle::None),
        VISUAL_DIRTY.with(|s| s.clone())
    );

    static Z_INDEX: TrackedSlotArray<i32> = tracked_slot_array(
        Some(0),
        VISUAL_DIRTY.with(|s| s.clone())
    );
}

// =============================================================================
// Capacity management
// =============================================================================

pub fn ensure_capacity(index: usize) {
    FG.with(|arr| arr.ensure_capacity(index + 1));
    BG.with(|arr| arr.ensure_capacity(index + 1));
    OPACITY.with(|arr| arr.ensure_capacity(index + 1));
    BORDER_STYLE.with(|arr| arr.ensure_capacity(index + 1));
    BORDER_COLOR.with(|arr| arr.ensure_capacity(index + 1));
    BORDER_TOP_STYLE.with(|arr| arr.ensure_capacity(index + 1));
    BORDER_RIGHT_STYLE.with(|arr| arr.ensure_capacity(index + 1));
    BORDER_BOTTOM_STYLE.with(|arr| arr.ensure_capacity(index + 1));
    BORDER_LEFT_STYLE.with(|arr| arr.ensure_capacity(index + 1));
    Z_INDEX.with(|arr| arr.ensure_capacity(index + 1));
}

pub fn clear_at_index(index: usize) {
    FG.with(|arr| arr.clear(index));
    BG.with(|arr| arr.clear(index));
    OPACITY.with(|arr| arr.clear(index));
    BORDER_STYLE.with(|arr| arr.clear(index));
    BORDER_COLOR.with(|arr| arr.clear(index));
    BORDER_TOP_STYLE.with(|arr| arr.clear(index));
    BORDER_RIGHT_STYLE.with(|arr| arr.clear(index));
    BORDER_BOTTOM_STYLE.with(|arr| arr.clear(index));
    BORDER_LEFT_STYLE.with(|arr| arr.clear(index));
    Z_INDEX.with(|arr| arr.clear(index));
}

pub fn reset() {
    fn wipe<T: Clone + PartialEq + 'static>(arr: &TrackedSlotArray<T>) {
        for i in 0..arr.len() {
            arr.clear(i);
        }
    }
    FG.with(|arr| wipe(arr));
    BG.with(|arr| wipe(arr));
    OPACITY.with(|arr| wipe(arr));
    BORDER_STYLE.with(|arr| wipe(arr));
    BORDER_COLOR.with(|arr| wipe(arr));
    BORDER_TOP_STYLE.with(|arr| wipe(arr));
    BORDER_RIGHT_STYLE.with(|arr| wipe(arr));
    BORDER_BOTTOM_STYLE.with(|arr| wipe(arr));
    BORDER_LEFT_STYLE.with(|arr| wipe(arr));
    Z_INDEX.with(|arr| wipe(arr));
}

// =============================================================================
// Colors
// =============================================================================

pub fn get_fg(index: usize) -> Rgba {
    FG.with(|arr| arr.get(index))
        .unwrap_or(Rgba::TERMINAL_DEFAULT)
}

pub fn set_fg(index: usize, color: Rgba) {
    FG.with(|arr| arr.set_value(index, color));
}

pub fn set_fg_getter<F>(index: usize, getter: F)
where
    F: Fn() -> Rgba + 'static,
{
    FG.with(|arr| arr.set_getter(index, getter));
}

pub fn get_bg(index: usize) -> Rgba {
    BG.with(|arr| arr.get(index))
        .unwrap_or(Rgba::TERMINAL_DEFAULT)
}

pub fn set_bg(index: usize, color: Rgba) {
    BG.with(|arr| arr.set_value(index, color));
}

pub fn set_bg_getter<F>(index: usize, getter: F)
where
    F: Fn() -> Rgba + 'static,
{
    BG.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Opacity
// =============================================================================

pub fn get_opacity(index: usize) -> u8 {
    OPACITY.with(|arr| arr.get(index)).unwrap_or(255)
}

pub fn set_opacity(index: usize, opacity: u8) {
    OPACITY.with(|arr| arr.set_value(index, opacity));
}

pub fn set_opacity_getter<F>(index: usize, getter: F)
where
    F: Fn() -> u8 + 'static,
{
    OPACITY.with(|arr| arr.set_getter(index, getter));
}

// =============================================================================
// Borders
// =============================================================================

pub fn get_border_style(index: usize) -> BorderStyle {
    BORDER_STYLE
        .with(|arr| arr.get(index))
        .unwrap_or(BorderStyle::None)
}

pub fn set_border_style(index: usize, style: BorderStyle) {
    BORDER_STYLE.with(|arr| arr.set_value(index, style));
}

pub fn set_border_style_getter<F>(index: usize, getter: F)
where
    F: Fn() -> BorderStyle + 'static,
{
    BORDER_STYLE.with(|arr| arr.set_getter(index, getter));
}

pub fn get_border_color(index: usize) -> Rgba {
    BORDER_COLOR
        .with(|arr| arr.get(index))
        .unwrap_or(Rgba::TERMINAL_DEFAULT)
}

pub fn set_border_color(index: usize, color: Rgba) {
    BORDER_COLOR.with(|arr| arr.set_value(index, color));
}

pub fn set_border_color_getter<F>(index: usize, getter: F)
where
    F: Fn() -> Rgba + 'static,
{
    BORDER_COLOR.with(|arr| arr.set_getter(index, getter));
}

/// Per-side style: falls back to the main border style when unset.
pub fn get_side_border_style(index: usize, side: u8) -> BorderStyle {
    let specific = match side {
        0 => BORDER_TOP_STYLE.with(|arr| arr.get(index)),
        1 => BORDER_RIGHT_STYLE.with(|arr| arr.get(index)),
        2 => BORDER_BOTTOM_STYLE.with(|arr| arr.get(index)),
        _ => BORDER_LEFT_STYLE.with(|arr| arr.get(index)),
    }
    .unwrap_or(BorderStyle::None);

    if specific == BorderStyle::None {
        get_border_style(index)
    } else {
        specific
    }
}

pub fn set_side_border_style(index: usize, side: u8, style: BorderStyle) {
    match side {
        0 => BORDER_TOP_STYLE.with(|arr| arr.set_value(index, style)),
        1 => BORDER_RIGHT_STYLE.with(|arr| arr.set_value(index, style)),
        2 => BORDER_BOTTOM_STYLE.with(|arr| arr.set_value(index, style)),
        _ => BORDER_LEFT_STYLE.with(|arr| arr.set_value(index, style)),
    }
}

// =============================================================================
// Z-index
// =============================================================================

pub fn get_z_index(index: usize) -> i32 {
    Z_INDEX.with(|arr| arr.get(index)).unwrap_or(0)
}

pub fn set_z_index(index: usize, z: i32) {
    Z_INDEX.with(|arr| arr.set_value(index, z));
}

pub fn set_z_index_getter<F>(index: usize, getter: F)
where
    F: Fn() -> i32 + 'static,
{
    Z_INDEX.with(|arr| arr.set_getter(index, getter));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset();
    }

    #[test]
    fn test_color_defaults() {
        setup();

        assert!(get_fg(0).is_terminal_default());
        assert!(get_bg(0).is_terminal_default());

        set_fg(0, Rgba::rgb(1, 2, 3));
        set_bg(0, Rgba::rgb(4, 5, 6));
        assert_eq!(get_fg(0), Rgba::rgb(1, 2, 3));
        assert_eq!(get_bg(0), Rgba::rgb(4, 5, 6));
    }

    #[test]
    fn test_opacity_default() {
        setup();

        assert_eq!(get_opacity(0), 255);
        set_opacity(0, 128);
        assert_eq!(get_opacity(0), 128);
    }

    #[test]
    fn test_side_border_fallback() {
        setup();

        set_border_style(0, BorderStyle::Single);
        assert_eq!(get_side_border_style(0, 0), BorderStyle::Single);

        set_side_border_style(0, 0, BorderStyle::Double);
        assert_eq!(get_side_border_style(0, 0), BorderStyle::Double);
        assert_eq!(get_side_border_style(0, 1), BorderStyle::Single);
    }

    #[test]
    fn test_z_index() {
        setup();

        assert_eq!(get_z_index(0), 0);
        set_z_index(0, -4);
        assert_eq!(get_z_index(0), -4);
    }
}
