//! Scroll manager.
//!
//! Offsets are user state in the interaction arrays; bounds come from the
//! computed layout. All operations clamp into `[0, maxScroll]`. Chaining
//! passes the unabsorbed residual to the nearest scrollable ancestor, which
//! is how nested scroll areas hand off at their edges.

use std::cell::RefCell;

use crate::engine::arrays::{core, interaction};
use crate::layout::ComputedLayout;

use super::focus;
use super::mouse::ScrollDirection;

// =============================================================================
// Constants
// =============================================================================

/// Arrow-key scroll step in lines.
pub const LINE_SCROLL: u16 = 1;

/// Mouse-wheel scroll step in lines.
pub const WHEEL_SCROLL: u16 = 3;

// =============================================================================
// Current layout holder
// =============================================================================

thread_local! {
    static CURRENT_LAYOUT: RefCell<Option<ComputedLayout>> = const { RefCell::new(None) };
}

/// Publish the layout the key/wheel handlers should scroll against.
/// The render effect refreshes this every frame.
pub fn set_current_layout(layout: ComputedLayout) {
    CURRENT_LAYOUT.with(|l| *l.borrow_mut() = Some(layout));
}

pub fn clear_current_layout() {
    CURRENT_LAYOUT.with(|l| *l.borrow_mut() = None);
}

/// Run `f` with the current layout, or None when none is published.
pub fn with_current_layout<R>(f: impl FnOnce(&ComputedLayout) -> R) -> Option<R> {
    CURRENT_LAYOUT.with(|l| l.borrow().as_ref().map(f))
}

// =============================================================================
// State access
// =============================================================================

pub fn is_scrollable(layout: &ComputedLayout, index: usize) -> bool {
    layout.scrollable.get(index).copied().unwrap_or(0) == 1
}

/// Current (x, y) scroll offset.
pub fn get_scroll_offset(index: usize) -> (u16, u16) {
    (
        interaction::get_scroll_offset_x(index),
        interaction::get_scroll_offset_y(index),
    )
}

/// (maxScrollX, maxScrollY) from the layout.
pub fn get_max_scroll(layout: &ComputedLayout, index: usize) -> (u16, u16) {
    (
        layout.max_scroll_x.get(index).copied().unwrap_or(0),
        layout.max_scroll_y.get(index).copied().unwrap_or(0),
    )
}

// =============================================================================
// Operations
// =============================================================================

/// Set the offset, clamped into bounds. No-op for non-scrollables.
pub fn set_scroll_offset(layout: &ComputedLayout, index: usize, x: u16, y: u16) {
    if !is_scrollable(layout, index) {
        return;
    }
    let (max_x, max_y) = get_max_scroll(layout, index);
    interaction::set_scroll_offset(index, x.min(max_x), y.min(max_y));
}

/// Scroll by a delta. Returns true iff any offset actually changed.
pub fn scroll_by(layout: &ComputedLayout, index: usize, dx: i32, dy: i32) -> bool {
    if !is_scrollable(layout, index) {
        return false;
    }

    let (cx, cy) = get_scroll_offset(index);
    let (max_x, max_y) = get_max_scroll(layout, index);

    let nx = (cx as i32 + dx).clamp(0, max_x as i32) as u16;
    let ny = (cy as i32 + dy).clamp(0, max_y as i32) as u16;

    if nx == cx && ny == cy {
        return false;
    }
    interaction::set_scroll_offset(index, nx, ny);
    true
}

/// Scroll with ancestor chaining: whatever this component cannot absorb is
/// offered to the nearest scrollable ancestor. Returns true iff any level
/// absorbed some delta.
pub fn scroll_by_with_chaining(layout: &ComputedLayout, index: usize, dx: i32, dy: i32) -> bool {
    let (mut residual_x, mut residual_y) = (dx, dy);
    let mut absorbed = false;

    if is_scrollable(layout, index) {
        let (cx, cy) = get_scroll_offset(index);
        let (max_x, max_y) = get_max_scroll(layout, index);

        let nx = (cx as i32 + dx).clamp(0, max_x as i32) as u16;
        let ny = (cy as i32 + dy).clamp(0, max_y as i32) as u16;

        residual_x = dx - (nx as i32 - cx as i32);
        residual_y = dy - (ny as i32 - cy as i32);

        if nx != cx || ny != cy {
            interaction::set_scroll_offset(index, nx, ny);
            absorbed = true;
        }
    }

    if residual_x != 0 || residual_y != 0 {
        if let Some(ancestor) = nearest_scrollable_ancestor(layout, index) {
            if scroll_by_with_chaining(layout, ancestor, residual_x, residual_y) {
                absorbed = true;
            }
        }
    }

    absorbed
}

fn nearest_scrollable_ancestor(layout: &ComputedLayout, index: usize) -> Option<usize> {
    let mut current = core::get_parent(index);
    let mut hops = 0;
    while let Some(p) = current {
        if is_scrollable(layout, p) {
            return Some(p);
        }
        hops += 1;
        if hops > 1024 {
            return None; // cycle guard
        }
        current = core::get_parent(p);
    }
    None
}

/// Scroll so the child's rectangle lies within the parent's viewport, moving
/// as little as possible.
pub fn scroll_into_view(layout: &ComputedLayout, child: usize, parent: usize) {
    if !is_scrollable(layout, parent) {
        return;
    }

    let (cx, cy, cw, ch) = layout.rect(child);
    let (px, py, pw, ph) = layout.rect(parent);
    let (ox, oy) = get_scroll_offset(parent);

    // Laid-out positions are scroll-independent, so these are coordinates in
    // the parent's content space.
    let child_left = cx as i32 - px as i32;
    let child_top = cy as i32 - py as i32;
    let child_right = child_left + cw as i32;
    let child_bottom = child_top + ch as i32;

    let view_left = ox as i32;
    let view_top = oy as i32;
    let view_right = view_left + pw as i32;
    let view_bottom = view_top + ph as i32;

    let mut nx = ox as i32;
    let mut ny = oy as i32;

    if child_left < view_left {
        nx = child_left;
    } else if child_right > view_right {
        nx = child_right - pw as i32;
    }
    if child_top < view_top {
        ny = child_top;
    } else if child_bottom > view_bottom {
        ny = child_bottom - ph as i32;
    }

    let (max_x, max_y) = get_max_scroll(layout, parent);
    interaction::set_scroll_offset(
        parent,
        nx.clamp(0, max_x as i32) as u16,
        ny.clamp(0, max_y as i32) as u16,
    );
}

// =============================================================================
// Key and wheel routing
// =============================================================================

fn direction_delta(direction: ScrollDirection, step: u16) -> (i32, i32) {
    match direction {
        ScrollDirection::Up => (0, -(step as i32)),
        ScrollDirection::Down => (0, step as i32),
        ScrollDirection::Left => (-(step as i32), 0),
        ScrollDirection::Right => (step as i32, 0),
    }
}

/// Scroll target for the built-in key bindings: the focused component, or
/// its nearest scrollable ancestor.
fn key_scroll_target(layout: &ComputedLayout) -> Option<usize> {
    let focused = focus::get_focused_index();
    if focused < 0 {
        return None;
    }
    let index = focused as usize;
    if is_scrollable(layout, index) {
        Some(index)
    } else {
        nearest_scrollable_ancestor(layout, index)
    }
}

/// Arrow key: one line on the focused scrollable. Returns true if consumed.
pub fn handle_arrow_scroll(layout: &ComputedLayout, direction: ScrollDirection) -> bool {
    let Some(target) = key_scroll_target(layout) else {
        return false;
    };
    let (dx, dy) = direction_delta(direction, LINE_SCROLL);
    scroll_by(layout, target, dx, dy)
}

/// PageUp/PageDown: viewport height − 1.
pub fn handle_page_scroll(layout: &ComputedLayout, direction: ScrollDirection) -> bool {
    let Some(target) = key_scroll_target(layout) else {
        return false;
    };
    let page = layout
        .height
        .get(target)
        .copied()
        .unwrap_or(0)
        .saturating_sub(1)
        .max(1);
    let (dx, dy) = direction_delta(direction, page);
    scroll_by(layout, target, dx, dy)
}

/// Home/End: jump to the top/bottom edge. Returns true if the offset moved.
pub fn handle_home_end(layout: &ComputedLayout, home: bool) -> bool {
    let Some(target) = key_scroll_target(layout) else {
        return false;
    };
    let (cx, cy) = get_scroll_offset(target);
    let (_, max_y) = get_max_scroll(layout, target);
    let ny = if home { 0 } else { max_y };
    if ny == cy {
        return false;
    }
    set_scroll_offset(layout, target, cx, ny);
    true
}

/// Mouse wheel: the scrollable under the cursor wins (walking up from the
/// hit component), else the focused scrollable. Three lines per notch.
pub fn handle_wheel(
    layout: &ComputedLayout,
    hit: Option<usize>,
    direction: ScrollDirection,
    delta: u16,
) -> bool {
    let step = delta.max(1) * WHEEL_SCROLL;
    let (dx, dy) = direction_delta(direction, step);

    if let Some(index) = hit {
        let target = if is_scrollable(layout, index) {
            Some(index)
        } else {
            nearest_scrollable_ancestor(layout, index)
        };
        if let Some(target) = target {
            return scroll_by_with_chaining(layout, target, dx, dy);
        }
    }

    match key_scroll_target(layout) {
        Some(target) => scroll_by_with_chaining(layout, target, dx, dy),
        None => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
