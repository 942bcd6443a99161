//! Focus manager — tab ring, history, trap stack.
//!
//! The ring is every allocated component with `focusable && visible`,
//! sorted by `(tabIndex, allocation order)`; negative tab indices are
//! excluded. A trap narrows the ring to the subtree of the top-of-stack
//! container so modal scopes cannot be tabbed out of.

use std::cell::RefCell;
use std::collections::HashMap;

use spark_signals::{signal, Signal};

use crate::engine::arrays::{core, interaction};
use crate::engine::{get_allocated_indices, get_id};

// =============================================================================
// Focused index
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<i32> = signal(-1);
}

/// Currently focused component index, −1 when none (reactive).
pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

pub fn has_focus() -> bool {
    get_focused_index() >= 0
}

pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

// =============================================================================
// Callbacks
// =============================================================================

#[derive(Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Box<dyn Fn()>>,
    pub on_blur: Option<Box<dyn Fn()>>,
}

thread_local! {
    // A component can hold several callback pairs (user callback plus the
    // input primitive's cursor bookkeeping).
    static CALLBACKS: RefCell<HashMap<usize, Vec<(usize, FocusCallbacks)>>> =
        RefCell::new(HashMap::new());
    static CALLBACK_ID: RefCell<usize> = const { RefCell::new(0) };
}

/// Register focus/blur callbacks for a component. Returns a cleanup closure.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let id = CALLBACK_ID.with(|c| {
        let mut c = c.borrow_mut();
        *c += 1;
        *c
    });
    CALLBACKS.with(|reg| {
        reg.borrow_mut()
            .entry(index)
            .or_default()
            .push((id, callbacks));
    });

    move || {
        CALLBACKS.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.get_mut(&index) {
                list.retain(|(cid, _)| *cid != id);
                if list.is_empty() {
                    reg.remove(&index);
                }
            }
        });
    }
}

fn fire_blur(index: usize) {
    CALLBACKS.with(|reg| {
        let reg = reg.borrow();
        if let Some(list) = reg.get(&index) {
            for (_, cb) in list {
                if let Some(ref on_blur) = cb.on_blur {
                    on_blur();
                }
            }
        }
    });
}

fn fire_focus(index: usize) {
    CALLBACKS.with(|reg| {
        let reg = reg.borrow();
        if let Some(list) = reg.get(&index) {
            for (_, cb) in list {
                if let Some(ref on_focus) = cb.on_focus {
                    on_focus();
                }
            }
        }
    });
}

/// Move focus, firing blur on the old holder and focus on the new one.
fn set_focus_with_callbacks(new_index: i32) {
    let old_index = get_focused_index();
    if old_index == new_index {
        return;
    }

    if old_index >= 0 {
        fire_blur(old_index as usize);
    }

    FOCUSED_INDEX.with(|s| s.set(new_index));

    if new_index >= 0 {
        fire_focus(new_index as usize);
    }
}

// =============================================================================
// Focus traps
// =============================================================================

thread_local! {
    static TRAP_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Restrict the ring to descendants of `container_index` (modal scope).
pub fn push_focus_trap(container_index: usize) {
    TRAP_STACK.with(|stack| stack.borrow_mut().push(container_index));
}

pub fn pop_focus_trap() -> Option<usize> {
    TRAP_STACK.with(|stack| stack.borrow_mut().pop())
}

pub fn is_focus_trapped() -> bool {
    TRAP_STACK.with(|stack| !stack.borrow().is_empty())
}

pub fn get_focus_trap_container() -> Option<usize> {
    TRAP_STACK.with(|stack| stack.borrow().last().copied())
}

/// Whether `index` is `container` or one of its descendants.
fn is_within(index: usize, container: usize) -> bool {
    if index == container {
        return true;
    }
    let mut current = core::get_parent(index);
    let mut hops = 0;
    while let Some(p) = current {
        if p == container {
            return true;
        }
        hops += 1;
        if hops > 1024 {
            return false; // cycle guard
        }
        current = core::get_parent(p);
    }
    false
}

fn passes_trap(index: usize) -> bool {
    match get_focus_trap_container() {
        Some(container) => is_within(index, container),
        None => true,
    }
}

// =============================================================================
// History
// =============================================================================

#[derive(Clone)]
struct HistoryEntry {
    index: usize,
    id: Option<String>,
}

thread_local! {
    static HISTORY: RefCell<Vec<HistoryEntry>> = RefCell::new(Vec::new());
}

const MAX_HISTORY: usize = 10;

/// Push the current focus onto the history stack (deduplicated against top).
pub fn save_focus_to_history() {
    let current = get_focused_index();
    if current < 0 {
        return;
    }
    let index = current as usize;
    let id = get_id(index);
    HISTORY.with(|history| {
        let mut history = history.borrow_mut();
        if history.last().map(|e| e.index) == Some(index) {
            return;
        }
        history.push(HistoryEntry { index, id });
        if history.len() > MAX_HISTORY {
            history.remove(0);
        }
    });
}

/// Pop history until a still-valid candidate is found. Returns true when
/// focus was restored.
pub fn restore_focus_from_history() -> bool {
    loop {
        let entry = HISTORY.with(|history| history.borrow_mut().pop());
        let Some(entry) = entry else {
            return false;
        };

        // The index may have been recycled for a different component.
        if get_id(entry.index) != entry.id {
            continue;
        }
        if interaction::get_focusable(entry.index)
            && core::get_visible(entry.index)
            && passes_trap(entry.index)
        {
            set_focus_with_callbacks(entry.index as i32);
            return true;
        }
    }
}

// =============================================================================
// Ring
// =============================================================================

/// Focusable + visible indices sorted by `(tabIndex, allocation order)`,
/// filtered by the active trap. Negative tab indices are excluded.
pub fn get_focusable_indices() -> Vec<usize> {
    let mut result: Vec<usize> = get_allocated_indices()
        .into_iter()
        .filter(|&i| {
            interaction::get_focusable(i)
                && core::get_visible(i)
                && interaction::get_tab_index(i) >= 0
                && passes_trap(i)
        })
        .collect();

    result.sort_by(|&a, &b| {
        let ta = interaction::get_tab_index(a);
        let tb = interaction::get_tab_index(b);
        ta.cmp(&tb).then(a.cmp(&b))
    });

    result
}

fn find_next_focusable(from_index: i32, direction: i32) -> i32 {
    let focusables = get_focusable_indices();
    if focusables.is_empty() {
        return -1;
    }

    let current_pos = if from_index >= 0 {
        focusables.iter().position(|&i| i == from_index as usize)
    } else {
        None
    };

    match current_pos {
        None => {
            if direction > 0 {
                focusables[0] as i32
            } else {
                focusables[focusables.len() - 1] as i32
            }
        }
        Some(pos) => {
            let len = focusables.len() as i32;
            let next = ((pos as i32 + direction) % len + len) % len;
            focusables[next as usize] as i32
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Focus a specific component. Fails (returns false) when it is not
/// focusable, not visible, or outside the active trap.
pub fn focus(index: usize) -> bool {
    if !interaction::get_focusable(index) || !core::get_visible(index) || !passes_trap(index) {
        return false;
    }
    if get_focused_index() != index as i32 {
        save_focus_to_history();
        set_focus_with_callbacks(index as i32);
    }
    true
}

/// Clear focus.
pub fn blur() {
    if get_focused_index() >= 0 {
        save_focus_to_history();
        set_focus_with_callbacks(-1);
    }
}

/// Advance the ring. Returns true when focus moved.
pub fn focus_next() -> bool {
    let current = get_focused_index();
    let next = find_next_focusable(current, 1);
    if next != -1 && next != current {
        save_focus_to_history();
        set_focus_with_callbacks(next);
        return true;
    }
    false
}

/// Step the ring backwards. Returns true when focus moved.
pub fn focus_previous() -> bool {
    let current = get_focused_index();
    let prev = find_next_focusable(current, -1);
    if prev != -1 && prev != current {
        save_focus_to_history();
        set_focus_with_callbacks(prev);
        return true;
    }
    false
}

pub fn focus_first() -> bool {
    match get_focusable_indices().first().copied() {
        Some(first) => focus(first),
        None => false,
    }
}

pub fn focus_last() -> bool {
    match get_focusable_indices().last().copied() {
        Some(last) => focus(last),
        None => false,
    }
}

/// Blur a focused component that is no longer valid (destroyed, hidden, or
/// now outside the trap). Called by dispatch before delivering key events.
pub fn validate_focus() {
    let current = get_focused_index();
    if current < 0 {
        return;
    }
    let index = current as usize;
    if !interaction::get_focusable(index) || !core::get_visible(index) || !passes_trap(index) {
        set_focus_with_callbacks(-1);
    }
}

// =============================================================================
// Reset (tests)
// =============================================================================

pub fn reset_focus_state() {
    FOCUSED_INDEX.with(|s| s.set(-1));
    TRAP_STACK.with(|stack| stack.borrow_mut().clear());
    HISTORY.with(|history| history.borrow_mut().clear());
    CALLBACKS.with(|reg| reg.borrow_mut().clear());
}

// =============================================================================
// Tests
// =============================================================================
