//! Mouse state, hit grid, and per-component dispatch.
//!
//! The hit grid is an `i16[width*height]` matrix refilled on every frame in
//! paint order, giving O(1) point → component lookup (−1 = empty). Dispatch
//! resolves the component under the cursor, maintains hover/press state in
//! the interaction arrays, and fans events out to component handlers first,
//! then global handlers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use spark_signals::{signal, Signal};

use super::keyboard::Modifiers;
use crate::engine::arrays::{core, interaction};
use crate::input::{self, MouseKind, ParsedEvent};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInfo {
    pub direction: ScrollDirection,
    pub delta: u16,
}

/// A mouse event after hit-grid resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    /// Zero-based cell coordinates.
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
    pub scroll: Option<ScrollInfo>,
    /// Component under the cursor, filled by dispatch.
    pub component_index: Option<usize>,
}

impl MouseEvent {
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
            scroll: None,
            component_index: None,
        }
    }

    pub fn down(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Down, button, x, y)
    }

    pub fn up(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Up, button, x, y)
    }

    pub fn move_to(x: u16, y: u16) -> Self {
        Self::new(MouseAction::Move, MouseButton::None, x, y)
    }

    pub fn scroll(x: u16, y: u16, direction: ScrollDirection, delta: u16) -> Self {
        Self {
            action: MouseAction::Scroll,
            button: MouseButton::None,
            x,
            y,
            modifiers: Modifiers::default(),
            scroll: Some(ScrollInfo { direction, delta }),
            component_index: None,
        }
    }
}

/// Convert a parser-level mouse event into a dispatchable one.
pub fn from_parsed(event: &input::MouseEvent) -> MouseEvent {
    let (action, button, scroll) = match event.kind {
        MouseKind::Press(b) => (MouseAction::Down, convert_button(b), None),
        MouseKind::Release(b) => (MouseAction::Up, convert_button(b), None),
        MouseKind::Move => (MouseAction::Move, MouseButton::None, None),
        MouseKind::ScrollUp => scroll_parts(ScrollDirection::Up),
        MouseKind::ScrollDown => scroll_parts(ScrollDirection::Down),
        MouseKind::ScrollLeft => scroll_parts(ScrollDirection::Left),
        MouseKind::ScrollRight => scroll_parts(ScrollDirection::Right),
    };

    MouseEvent {
        action,
        button,
        x: event.x,
        y: event.y,
        modifiers: event.modifiers.into(),
        scroll,
        component_index: None,
    }
}

fn scroll_parts(direction: ScrollDirection) -> (MouseAction, MouseButton, Option<ScrollInfo>) {
    (
        MouseAction::Scroll,
        MouseButton::None,
        Some(ScrollInfo {
            direction,
            delta: 1,
        }),
    )
}

fn convert_button(b: input::MouseButton) -> MouseButton {
    match b {
        input::MouseButton::Left => MouseButton::Left,
        input::MouseButton::Middle => MouseButton::Middle,
        input::MouseButton::Right => MouseButton::Right,
    }
}

/// Convenience for the router: dispatch a parser event directly.
pub fn dispatch_parsed(event: &ParsedEvent) -> bool {
    match event {
        ParsedEvent::Mouse(m) => dispatch(from_parsed(m)),
        ParsedEvent::Key(_) => false,
    }
}

// =============================================================================
// Hit grid
// =============================================================================

/// O(1) point → component lookup. Cells hold a component index or −1.
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<i16>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![-1; size],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize (tracks terminal size) and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, -1);
    }

    pub fn clear(&mut self) {
        self.cells.fill(-1);
    }

    /// Fill a rectangle with a component index, clipped to bounds.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, index: usize) {
        if index > i16::MAX as usize {
            return;
        }
        let value = index as i16;
        for dy in 0..height {
            let cy = y + dy;
            if cy >= self.height {
                break;
            }
            let row = cy as usize * self.width as usize;
            for dx in 0..width {
                let cx = x + dx;
                if cx >= self.width {
                    break;
                }
                self.cells[row + cx as usize] = value;
            }
        }
    }

    /// Component at a point; out-of-bounds clips to None.
    pub fn get(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let value = self.cells[y as usize * self.width as usize + x as usize];
        if value < 0 {
            None
        } else {
            Some(value as usize)
        }
    }
}

thread_local! {
    static HIT_GRID: RefCell<HitGrid> = RefCell::new(HitGrid::new(80, 24));
}

pub fn resize_hit_grid(width: u16, height: u16) {
    HIT_GRID.with(|g| g.borrow_mut().resize(width, height));
}

pub fn clear_hit_grid() {
    HIT_GRID.with(|g| g.borrow_mut().clear());
}

pub fn fill_hit_rect(x: u16, y: u16, width: u16, height: u16, index: usize) {
    HIT_GRID.with(|g| g.borrow_mut().fill_rect(x, y, width, height, index));
}

pub fn hit_test(x: u16, y: u16) -> Option<usize> {
    HIT_GRID.with(|g| g.borrow().get(x, y))
}

pub fn hit_grid_size() -> (u16, u16) {
    HIT_GRID.with(|g| {
        let grid = g.borrow();
        (grid.width(), grid.height())
    })
}

// =============================================================================
// Reactive state
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<MouseEvent>> = signal(None);
    static MOUSE_X: Signal<u16> = signal(0);
    static MOUSE_Y: Signal<u16> = signal(0);
    static IS_MOUSE_DOWN: Signal<bool> = signal(false);
    static HOVERED_COMPONENT: Signal<Option<usize>> = signal(None);
    static PRESSED_COMPONENT: Signal<Option<usize>> = signal(None);
    static PRESSED_BUTTON: Signal<MouseButton> = signal(MouseButton::None);
}

pub fn last_event() -> Option<MouseEvent> {
    LAST_EVENT.with(|s| s.get())
}

pub fn mouse_position() -> (u16, u16) {
    (MOUSE_X.with(|s| s.get()), MOUSE_Y.with(|s| s.get()))
}

pub fn is_mouse_down() -> bool {
    IS_MOUSE_DOWN.with(|s| s.get())
}

pub fn hovered_component() -> Option<usize> {
    HOVERED_COMPONENT.with(|s| s.get())
}

pub fn pressed_component() -> Option<usize> {
    PRESSED_COMPONENT.with(|s| s.get())
}

// =============================================================================
// Handlers
// =============================================================================

/// Per-component mouse handlers. `Rc` so callbacks can be shared with the
/// wrapping closures primitives build (click-to-focus).
#[derive(Default)]
pub struct MouseHandlers {
    pub on_mouse_down: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_mouse_up: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_click: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_mouse_enter: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_mouse_leave: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_scroll: Option<Rc<dyn Fn(&MouseEvent) -> bool>>,
}

pub type MouseHandler = Box<dyn Fn(&MouseEvent) -> bool>;

struct Registry {
    components: HashMap<usize, MouseHandlers>,
    global_down: Vec<(usize, MouseHandler)>,
    global_up: Vec<(usize, MouseHandler)>,
    global_click: Vec<(usize, MouseHandler)>,
    global_scroll: Vec<(usize, MouseHandler)>,
    next_id: usize,
}

impl Registry {
    fn new() -> Self {
        Self {
            components: HashMap::new(),
            global_down: Vec::new(),
            global_up: Vec::new(),
            global_click: Vec::new(),
            global_scroll: Vec::new(),
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

fn guarded(run: impl FnOnce() -> bool) -> bool {
    match catch_unwind(AssertUnwindSafe(run)) {
        Ok(consumed) => consumed,
        Err(_) => {
            log::error!("mouse handler panicked; continuing dispatch");
            false
        }
    }
}

/// Register handlers for a component. Returns a cleanup closure.
pub fn on_component(index: usize, handlers: MouseHandlers) -> impl FnOnce() {
    REGISTRY.with(|reg| {
        reg.borrow_mut().components.insert(index, handlers);
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut().components.remove(&index);
        });
    }
}

macro_rules! global_registration {
    ($name:ident, $field:ident) => {
        /// Register a global handler. Returns a cleanup closure.
        pub fn $name<F>(handler: F) -> impl FnOnce()
        where
            F: Fn(&MouseEvent) -> bool + 'static,
        {
            let id = REGISTRY.with(|reg| {
                let mut reg = reg.borrow_mut();
                let id = reg.next_id();
                reg.$field.push((id, Box::new(handler)));
                id
            });

            move || {
                REGISTRY.with(|reg| {
                    reg.borrow_mut().$field.retain(|(hid, _)| *hid != id);
                });
            }
        }
    };
}

global_registration!(on_mouse_down, global_down);
global_registration!(on_mouse_up, global_up);
global_registration!(on_click, global_click);
global_registration!(on_scroll, global_scroll);

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch a mouse event: resolve the hit grid, maintain hover/press
/// state, and run the handler chain. Returns true when consumed.
pub fn dispatch(mut event: MouseEvent) -> bool {
    event.component_index = hit_test(event.x, event.y).filter(|&i| {
        interaction::get_mouse_enabled(i)
    });

    LAST_EVENT.with(|s| s.set(Some(event.clone())));
    MOUSE_X.with(|s| s.set(event.x));
    MOUSE_Y.with(|s| s.set(event.y));

    match event.action {
        MouseAction::Down => IS_MOUSE_DOWN.with(|s| s.set(true)),
        MouseAction::Up => IS_MOUSE_DOWN.with(|s| s.set(false)),
        _ => false,
    };

    update_hover(&event);

    match event.action {
        MouseAction::Scroll => dispatch_scroll(&event),
        MouseAction::Down => dispatch_down(&event),
        MouseAction::Up => dispatch_up(&event),
        _ => false,
    }
}

/// Hover enter/leave whenever the component under the cursor changes.
fn update_hover(event: &MouseEvent) {
    let current = event.component_index;
    let previous = HOVERED_COMPONENT.with(|s| s.get());
    if current == previous {
        return;
    }

    if let Some(prev) = previous {
        let leave_handler = REGISTRY.with(|reg| {
            reg.borrow()
                .components
                .get(&prev)
                .and_then(|h| h.on_mouse_leave.clone())
        });
        if let Some(on_leave) = leave_handler {
            let mut leave = event.clone();
            leave.component_index = Some(prev);
            guarded(|| {
                on_leave(&leave);
                false
            });
        }
        interaction::set_hovered(prev, false);
    }

    if let Some(idx) = current {
        let enter = REGISTRY.with(|reg| {
            reg.borrow()
                .components
                .get(&idx)
                .and_then(|h| h.on_mouse_enter.clone())
        });
        if let Some(on_enter) = enter {
            guarded(|| {
                on_enter(event);
                false
            });
        }
        interaction::set_hovered(idx, true);
    }

    HOVERED_COMPONENT.with(|s| s.set(current));
}

/// Scroll: component handler first, then globals.
fn dispatch_scroll(event: &MouseEvent) -> bool {
    if let Some(idx) = event.component_index {
        let handler = REGISTRY.with(|reg| {
            reg.borrow()
                .components
                .get(&idx)
                .and_then(|h| h.on_scroll.clone())
        });
        if let Some(on_scroll) = handler {
            if guarded(|| on_scroll(event)) {
                return true;
            }
        }
    }

    run_globals(event, |reg| &reg.global_scroll)
}

fn dispatch_down(event: &MouseEvent) -> bool {
    PRESSED_COMPONENT.with(|s| s.set(event.component_index));
    PRESSED_BUTTON.with(|s| s.set(event.button));

    if let Some(idx) = event.component_index {
        interaction::set_pressed(idx, true);
        let handler = REGISTRY.with(|reg| {
            reg.borrow()
                .components
                .get(&idx)
                .and_then(|h| h.on_mouse_down.clone())
        });
        if let Some(on_down) = handler {
            guarded(|| {
                on_down(event);
                false
            });
        }
    }

    run_globals(event, |reg| &reg.global_down)
}

fn dispatch_up(event: &MouseEvent) -> bool {
    let pressed_idx = PRESSED_COMPONENT.with(|s| s.get());
    let pressed_btn = PRESSED_BUTTON.with(|s| s.get());

    if let Some(idx) = pressed_idx {
        interaction::set_pressed(idx, false);
    }

    if let Some(idx) = event.component_index {
        let handler = REGISTRY.with(|reg| {
            reg.borrow()
                .components
                .get(&idx)
                .and_then(|h| h.on_mouse_up.clone())
        });
        if let Some(on_up) = handler {
            guarded(|| {
                on_up(event);
                false
            });
        }
    }

    let mut consumed = run_globals(event, |reg| &reg.global_up);

    // Click: press and release on the same component with the same button.
    if pressed_idx == event.component_index && pressed_btn == event.button {
        if let Some(idx) = event.component_index {
            // Bubble up the parent chain to the nearest click handler.
            let mut current = Some(idx);
            while let Some(ci) = current {
                let handler = REGISTRY.with(|reg| {
                    reg.borrow()
                        .components
                        .get(&ci)
                        .and_then(|h| h.on_click.clone())
                });
                if let Some(on_click) = handler {
                    guarded(|| {
                        on_click(event);
                        false
                    });
                    break;
                }
                current = core::get_parent(ci);
            }
        }

        if run_globals(event, |reg| &reg.global_click) {
            consumed = true;
        }
    }

    PRESSED_COMPONENT.with(|s| s.set(None));
    PRESSED_BUTTON.with(|s| s.set(MouseButton::None));

    consumed
}

fn run_globals(
    event: &MouseEvent,
    pick: impl Fn(&Registry) -> &Vec<(usize, MouseHandler)>,
) -> bool {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        for (_, handler) in pick(&reg) {
            if guarded(|| handler(event)) {
                return true;
            }
        }
        false
    })
}

// =============================================================================
// Cleanup
// =============================================================================

/// Drop component handlers and hover/press tracking for a released index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().components.remove(&index);
    });

    if HOVERED_COMPONENT.with(|s| s.get()) == Some(index) {
        HOVERED_COMPONENT.with(|s| s.set(None));
    }
    if PRESSED_COMPONENT.with(|s| s.get()) == Some(index) {
        PRESSED_COMPONENT.with(|s| s.set(None));
        PRESSED_BUTTON.with(|s| s.set(MouseButton::None));
    }
}

/// Reset all mouse state.
pub fn reset_mouse_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = Registry::new());
    LAST_EVENT.with(|s| s.set(None));
    MOUSE_X.with(|s| s.set(0));
    MOUSE_Y.with(|s| s.set(0));
    IS_MOUSE_DOWN.with(|s| s.set(false));
    HOVERED_COMPONENT.with(|s| s.set(None));
    PRESSED_COMPONENT.with(|s| s.set(None));
    PRESSED_BUTTON.with(|s| s.set(MouseButton::None));
    HIT_GRID.with(|g| g.borrow_mut().resize(80, 24));
}

// =============================================================================
// Tests
// =============================================================================
