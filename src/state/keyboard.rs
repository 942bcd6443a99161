//! Keyboard event state and handler registry.
//!
//! Holds the last-event signal and three handler tiers: global handlers,
//! per-key handlers, and per-component handlers that only fire while that
//! component has focus. Routing order across tiers is enforced by
//! `state::router`; this module only stores and invokes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use spark_signals::{signal, Signal};

use crate::input::{KeyEvent, KeyPhase, Modifier};

// =============================================================================
// Types
// =============================================================================

/// Modifier state on a keyboard event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::default()
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

impl From<Modifier> for Modifiers {
    fn from(m: Modifier) -> Self {
        Self {
            ctrl: m.contains(Modifier::CTRL),
            alt: m.contains(Modifier::ALT),
            shift: m.contains(Modifier::SHIFT),
            meta: m.contains(Modifier::META),
        }
    }
}

/// Press / repeat / release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

impl From<KeyPhase> for KeyState {
    fn from(p: KeyPhase) -> Self {
        match p {
            KeyPhase::Press => Self::Press,
            KeyPhase::Repeat => Self::Repeat,
            KeyPhase::Release => Self::Release,
        }
    }
}

/// A keyboard event as seen by handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// Canonical key name ("a", "Enter", "ArrowUp", ...).
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// True for a plain printable character (no ctrl/alt/meta).
    pub fn printable_char(&self) -> Option<char> {
        if self.modifiers.ctrl || self.modifiers.alt || self.modifiers.meta {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

impl From<&KeyEvent> for KeyboardEvent {
    fn from(event: &KeyEvent) -> Self {
        Self {
            key: event.code.name(),
            modifiers: event.modifiers.into(),
            state: event.phase.into(),
        }
    }
}

/// Handler for keyboard events. Return true to consume.
pub type KeyHandler = Box<dyn Fn(&KeyboardEvent) -> bool>;

/// Handler for a specific key. Return true to consume.
pub type KeySpecificHandler = Box<dyn Fn() -> bool>;

// =============================================================================
// State
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

/// Last keyboard event (reactive).
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

/// Last key name (reactive), empty when none yet.
pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

/// Update the last-event signal without dispatching.
pub fn update_last_event(event: KeyboardEvent) {
    LAST_EVENT.with(|s| s.set(Some(event)));
}

// =============================================================================
// Handler registry
// =============================================================================

struct Registry {
    global: Vec<(usize, KeyHandler)>,
    by_key: HashMap<String, Vec<(usize, KeySpecificHandler)>>,
    focused: HashMap<usize, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

impl Registry {
    fn new() -> Self {
        Self {
            global: Vec::new(),
            by_key: HashMap::new(),
            focused: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::new());
}

/// Invoke a handler; a panic counts as "not consumed" and is reported.
fn guarded(run: impl FnOnce() -> bool) -> bool {
    match catch_unwind(AssertUnwindSafe(run)) {
        Ok(consumed) => consumed,
        Err(_) => {
            log::error!("keyboard handler panicked; continuing dispatch");
            false
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch to per-key and global handlers. Returns true when consumed.
pub fn dispatch_to_handlers(event: &KeyboardEvent) -> bool {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();

        if let Some(handlers) = reg.by_key.get(&event.key) {
            for (_, handler) in handlers {
                if guarded(|| handler()) {
                    return true;
                }
            }
        }

        for (_, handler) in &reg.global {
            if guarded(|| handler(event)) {
                return true;
            }
        }

        false
    })
}

/// Dispatch to the focused component's handlers (FIFO per component).
pub fn dispatch_focused(focused_index: i32, event: &KeyboardEvent) -> bool {
    if focused_index < 0 {
        return false;
    }

    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        if let Some(handlers) = reg.focused.get(&(focused_index as usize)) {
            for (_, handler) in handlers {
                if guarded(|| handler(event)) {
                    return true;
                }
            }
        }
        false
    })
}

/// Convenience used by tests: update state and run the handler tiers.
pub fn dispatch(event: KeyboardEvent) -> bool {
    update_last_event(event.clone());
    if event.state != KeyState::Press {
        return false;
    }
    dispatch_to_handlers(&event)
}

// =============================================================================
// Registration
// =============================================================================

/// Subscribe to all keyboard events. Returns a cleanup closure.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global.push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut().global.retain(|(hid, _)| *hid != id);
        });
    }
}

/// Subscribe to a specific key. Returns a cleanup closure.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + 'static,
{
    let key = key.to_string();
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.by_key
            .entry(key.clone())
            .or_default()
            .push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.by_key.get_mut(&key) {
                handlers.retain(|(hid, _)| *hid != id);
                if handlers.is_empty() {
                    reg.by_key.remove(&key);
                }
            }
        });
    }
}

/// Subscribe to events delivered while `index` has focus.
pub fn on_focused<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.focused
            .entry(index)
            .or_default()
            .push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.focused.get_mut(&index) {
                handlers.retain(|(hid, _)| *hid != id);
                if handlers.is_empty() {
                    reg.focused.remove(&index);
                }
            }
        });
    }
}

/// Drop all handlers for a released component.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().focused.remove(&index);
    });
}

/// Reset all keyboard state.
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = Registry::new());
    LAST_EVENT.with(|s| s.set(None));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        reset_keyboard_state();
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert!(last_event().is_none());
        assert_eq!(last_key(), "");
    }

    #[test]
    fn test_dispatch_updates_last_event() {
        setup();

        dispatch(KeyboardEvent::new("a"));
        assert_eq!(last_key(), "a");

        dispatch(KeyboardEvent::new("Enter"));
        assert_eq!(last_key(), "Enter");
    }

    #[test]
    fn test_global_handler_and_cleanup() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let cleanup = on(move |_| {
            count_clone.set(count_clone.get() + 1);
            false
        });

        dispatch(KeyboardEvent::new("a"));
        dispatch(KeyboardEvent::new("b"));
        assert_eq!(count.get(), 2);

        cleanup();
        dispatch(KeyboardEvent::new("c"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_key_specific_handler() {
        setup();

        let enter = Rc::new(Cell::new(0));
        let enter_clone = enter.clone();

        let _cleanup = on_key("Enter", move || {
            enter_clone.set(enter_clone.get() + 1);
            true
        });

        dispatch(KeyboardEvent::new("a"));
        assert_eq!(enter.get(), 0);

        dispatch(KeyboardEvent::new("Enter"));
        assert_eq!(enter.get(), 1);
    }

    #[test]
    fn test_consume_stops_chain() {
        setup();

        let reached = Rc::new(Cell::new(false));
        let reached_clone = reached.clone();

        let _c1 = on_key("Enter", || true);
        let _c2 = on(move |_| {
            reached_clone.set(true);
            false
        });

        assert!(dispatch(KeyboardEvent::new("Enter")));
        assert!(!reached.get());
    }

    #[test]
    fn test_focused_handler_by_index() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let cleanup = on_focused(5, move |_| {
            count_clone.set(count_clone.get() + 1);
            false
        });

        let event = KeyboardEvent::new("a");
        dispatch_focused(3, &event);
        assert_eq!(count.get(), 0);

        dispatch_focused(5, &event);
        assert_eq!(count.get(), 1);

        cleanup();
        dispatch_focused(5, &event);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_break_dispatch() {
        setup();

        let reached = Rc::new(Cell::new(false));
        let reached_clone = reached.clone();

        let _c1 = on(|_| panic!("user bug"));
        let _c2 = on(move |_| {
            reached_clone.set(true);
            true
        });

        assert!(dispatch(KeyboardEvent::new("x")));
        assert!(reached.get());
    }

    #[test]
    fn test_only_press_reaches_handlers() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let _cleanup = on(move |_| {
            count_clone.set(count_clone.get() + 1);
            false
        });

        let mut event = KeyboardEvent::new("a");
        event.state = KeyState::Release;
        dispatch(event);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_printable_char() {
        assert_eq!(KeyboardEvent::new("a").printable_char(), Some('a'));
        assert_eq!(KeyboardEvent::new("é").printable_char(), Some('é'));
        assert_eq!(KeyboardEvent::new("Enter").printable_char(), None);
        assert_eq!(
            KeyboardEvent::with_modifiers("a", Modifiers::ctrl()).printable_char(),
            None
        );
    }

    #[test]
    fn test_from_parser_event() {
        use crate::input::{KeyCode, KeyEvent, KeyPhase, Modifier};

        let parsed = KeyEvent {
            code: KeyCode::Up,
            modifiers: Modifier::CTRL | Modifier::SHIFT,
            phase: KeyPhase::Press,
        };
        let event = KeyboardEvent::from(&parsed);
        assert_eq!(event.key, "ArrowUp");
        assert!(event.modifiers.ctrl);
        assert!(event.modifiers.shift);
        assert!(!event.modifiers.alt);
    }
}
