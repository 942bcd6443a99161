//! Central input router.
//!
//! Every parsed event funnels through here in a fixed priority order:
//!
//! 1. System hotkeys (Ctrl+C shutdown, when enabled)
//! 2. Tab / Shift+Tab focus navigation (always consumed)
//! 3. The focused component's key handlers
//! 4. Built-in scroll bindings (arrows, PageUp/Down, Home/End)
//! 5. Global key handlers
//!
//! Mouse events resolve through the hit grid inside `mouse::dispatch`; a
//! wheel event no handler consumed falls through to the scroll manager.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::input::ParsedEvent;

use super::keyboard::{self, KeyboardEvent};
use super::mouse::{self, MouseAction};
use super::{focus, scroll};

// =============================================================================
// Session state
// =============================================================================

thread_local! {
    /// Shutdown flag set by Ctrl+C; None when exit-on-ctrl-c is disabled.
    static RUNNING: RefCell<Option<Arc<AtomicBool>>> = const { RefCell::new(None) };
}

/// Handle for the router session; keeps the running flag installed until
/// cleaned up.
pub struct RouterHandle {
    _running: Arc<AtomicBool>,
}

impl RouterHandle {
    pub fn cleanup(self) {
        RUNNING.with(|r| *r.borrow_mut() = None);
    }
}

/// Install the shutdown flag Ctrl+C should clear.
pub fn install_exit_flag(running: Arc<AtomicBool>) -> RouterHandle {
    RUNNING.with(|r| *r.borrow_mut() = Some(running.clone()));
    RouterHandle { _running: running }
}

fn exit_flag() -> Option<Arc<AtomicBool>> {
    RUNNING.with(|r| r.borrow().clone())
}

// =============================================================================
// Entry points
// =============================================================================

/// Route a parser event. Returns true when consumed.
pub fn route_parsed_event(event: &ParsedEvent) -> bool {
    match event {
        ParsedEvent::Key(k) => route_key_event(&KeyboardEvent::from(k)),
        ParsedEvent::Mouse(m) => route_mouse_event(&mouse::from_parsed(m)),
    }
}

/// Route a keyboard event through the priority chain.
pub fn route_key_event(event: &KeyboardEvent) -> bool {
    // A focused component that became invalid blurs before delivery.
    focus::validate_focus();

    // 1. System hotkeys.
    if event.is_press() && event.modifiers.ctrl && event.key == "c" {
        if let Some(running) = exit_flag() {
            running.store(false, Ordering::SeqCst);
            return true;
        }
    }

    keyboard::update_last_event(event.clone());

    // Repeat/release still reach the focused component (some track state),
    // but never navigate or scroll.
    if !event.is_press() {
        let focused = focus::get_focused_index();
        if focused >= 0 {
            keyboard::dispatch_focused(focused, event);
        }
        return false;
    }

    // 2. Tab ring (always consumed).
    if event.key == "Tab" && !event.modifiers.ctrl && !event.modifiers.alt {
        if event.modifiers.shift {
            focus::focus_previous();
        } else {
            focus::focus_next();
        }
        return true;
    }

    // 3. Focused component handlers.
    let focused = focus::get_focused_index();
    if focused >= 0 && keyboard::dispatch_focused(focused, event) {
        return true;
    }

    // 4. Built-in scroll bindings.
    if route_scroll_keys(event) {
        return true;
    }

    // 5. Global handlers.
    keyboard::dispatch_to_handlers(event)
}

/// Route a mouse event: handler chain first, then the wheel fallback to the
/// scroll manager.
pub fn route_mouse_event(event: &mouse::MouseEvent) -> bool {
    let consumed = mouse::dispatch(event.clone());
    if consumed {
        return true;
    }

    if event.action == MouseAction::Scroll {
        if let Some(info) = event.scroll {
            let hit = mouse::hit_test(event.x, event.y);
            return scroll::with_current_layout(|layout| {
                scroll::handle_wheel(layout, hit, info.direction, info.delta)
            })
            .unwrap_or(false);
        }
    }

    false
}

// =============================================================================
// Built-in scroll bindings
// =============================================================================

fn route_scroll_keys(event: &KeyboardEvent) -> bool {
    use super::mouse::ScrollDirection;

    if event.modifiers.ctrl || event.modifiers.alt || event.modifiers.meta {
        return false;
    }

    match event.key.as_str() {
        "ArrowUp" => scroll_with(|l| scroll::handle_arrow_scroll(l, ScrollDirection::Up)),
        "ArrowDown" => scroll_with(|l| scroll::handle_arrow_scroll(l, ScrollDirection::Down)),
        "ArrowLeft" => scroll_with(|l| scroll::handle_arrow_scroll(l, ScrollDirection::Left)),
        "ArrowRight" => scroll_with(|l| scroll::handle_arrow_scroll(l, ScrollDirection::Right)),
        "PageUp" => scroll_with(|l| scroll::handle_page_scroll(l, ScrollDirection::Up)),
        "PageDown" => scroll_with(|l| scroll::handle_page_scroll(l, ScrollDirection::Down)),
        "Home" => scroll_with(|l| scroll::handle_home_end(l, true)),
        "End" => scroll_with(|l| scroll::handle_home_end(l, false)),
        _ => false,
    }
}

fn scroll_with(f: impl FnOnce(&crate::layout::ComputedLayout) -> bool) -> bool {
    scroll::with_current_layout(f).unwrap_or(false)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::interaction;
    use crate::engine::{allocate_index, reset_registry};
    use crate::layout::ComputedLayout;
    use crate::state::focus::reset_focus_state;
    use crate::state::keyboard::{reset_keyboard_state, Modifiers};
    use crate::state::mouse::reset_mouse_state;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        reset_registry();
        reset_focus_state();
        reset_keyboard_state();
        reset_mouse_state();
        scroll::clear_current_layout();
        RUNNING.with(|r| *r.borrow_mut() = None);
    }

    fn scroll_layout(entries: &[(usize, u16, u16)]) -> ComputedLayout {
        let size = entries.iter().map(|(i, _, _)| *i).max().unwrap_or(0) + 1;
        let mut layout = ComputedLayout::with_capacity(size);
        layout.width = vec![80; size];
        layout.height = vec![24; size];
        for &(i, mx, my) in entries {
            layout.scrollable[i] = 1;
            layout.max_scroll_x[i] = mx;
            layout.max_scroll_y[i] = my;
        }
        layout
    }

    fn focusable() -> usize {
        let idx = allocate_index(None);
        interaction::set_focusable(idx, true);
        idx
    }

    #[test]
    fn test_ctrl_c_clears_running() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let _handle = install_exit_flag(running.clone());

        let consumed = route_key_event(&KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(consumed);
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_plain_c_does_not_exit() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let _handle = install_exit_flag(running.clone());

        route_key_event(&KeyboardEvent::new("c"));
        assert!(running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_ctrl_c_without_flag_not_consumed() {
        setup();

        let consumed = route_key_event(&KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(!consumed);
    }

    #[test]
    fn test_tab_navigates_ring() {
        setup();

        let a = focusable();
        let b = focusable();

        focus::focus(a);
        assert!(route_key_event(&KeyboardEvent::new("Tab")));
        assert_eq!(focus::get_focused_index(), b as i32);

        assert!(route_key_event(&KeyboardEvent::with_modifiers(
            "Tab",
            Modifiers::shift()
        )));
        assert_eq!(focus::get_focused_index(), a as i32);
    }

    #[test]
    fn test_tab_consumed_before_component_handlers() {
        setup();

        let tab_seen = Rc::new(Cell::new(0));
        let t = tab_seen.clone();

        let a = focusable();
        let _b = focusable();
        let _cleanup = keyboard::on_focused(a, move |event| {
            if event.key == "Tab" {
                t.set(t.get() + 1);
                return true;
            }
            false
        });

        focus::focus(a);
        route_key_event(&KeyboardEvent::new("Tab"));

        assert_eq!(tab_seen.get(), 0);
        assert_ne!(focus::get_focused_index(), a as i32);
    }

    #[test]
    fn test_focused_component_consumes_before_scroll() {
        setup();

        let arrows = Rc::new(Cell::new(0));
        let a = arrows.clone();

        let idx = focusable();
        let _cleanup = keyboard::on_focused(idx, move |event| {
            if event.key == "ArrowDown" {
                a.set(a.get() + 1);
                return true;
            }
            false
        });

        focus::focus(idx);
        scroll::set_current_layout(scroll_layout(&[(idx, 10, 50)]));

        assert!(route_key_event(&KeyboardEvent::new("ArrowDown")));
        assert_eq!(arrows.get(), 1);
        assert_eq!(interaction::get_scroll_offset_y(idx), 0);
    }

    #[test]
    fn test_scroll_when_component_does_not_consume() {
        setup();

        let idx = focusable();
        focus::focus(idx);
        scroll::set_current_layout(scroll_layout(&[(idx, 10, 50)]));

        assert!(route_key_event(&KeyboardEvent::new("ArrowDown")));
        assert_eq!(interaction::get_scroll_offset_y(idx), scroll::LINE_SCROLL);
    }

    #[test]
    fn test_scroll_runs_before_global_handlers() {
        setup();

        let global_seen = Rc::new(Cell::new(0));
        let g = global_seen.clone();
        let _cleanup = keyboard::on(move |event| {
            if event.key == "ArrowDown" {
                g.set(g.get() + 1);
                return true;
            }
            false
        });

        let idx = focusable();
        focus::focus(idx);
        scroll::set_current_layout(scroll_layout(&[(idx, 0, 50)]));

        assert!(route_key_event(&KeyboardEvent::new("ArrowDown")));
        // Scroll consumed it; the global handler never ran.
        assert_eq!(global_seen.get(), 0);
        assert_eq!(interaction::get_scroll_offset_y(idx), 1);
    }

    #[test]
    fn test_global_handler_as_last_resort() {
        setup();

        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let _cleanup = keyboard::on(move |event| {
            if event.key == "x" {
                s.set(s.get() + 1);
                return true;
            }
            false
        });

        assert!(route_key_event(&KeyboardEvent::new("x")));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_release_not_routed_to_navigation() {
        setup();

        let a = focusable();
        let _b = focusable();
        focus::focus(a);

        let mut tab = KeyboardEvent::new("Tab");
        tab.state = crate::state::keyboard::KeyState::Release;
        assert!(!route_key_event(&tab));
        assert_eq!(focus::get_focused_index(), a as i32);
    }

    #[test]
    fn test_wheel_fallback_scrolls_under_cursor() {
        setup();

        let idx = allocate_index(None);
        scroll::set_current_layout(scroll_layout(&[(idx, 0, 50)]));
        mouse::fill_hit_rect(0, 0, 10, 10, idx);

        let event = mouse::MouseEvent::scroll(5, 5, mouse::ScrollDirection::Down, 1);
        assert!(route_mouse_event(&event));
        assert_eq!(
            interaction::get_scroll_offset_y(idx),
            scroll::WHEEL_SCROLL
        );
    }

    #[test]
    fn test_component_scroll_handler_preempts_manager() {
        setup();

        let idx = allocate_index(None);
        scroll::set_current_layout(scroll_layout(&[(idx, 0, 50)]));
        mouse::fill_hit_rect(0, 0, 10, 10, idx);

        let _cleanup = mouse::on_component(
            idx,
            mouse::MouseHandlers {
                on_scroll: Some(Rc::new(|_| true)),
                ..Default::default()
            },
        );

        let event = mouse::MouseEvent::scroll(5, 5, mouse::ScrollDirection::Down, 1);
        assert!(route_mouse_event(&event));
        assert_eq!(interaction::get_scroll_offset_y(idx), 0);
    }
}
