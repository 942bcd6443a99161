//! Input primitive — single-line text editing.
//!
//! Owns a local cursor signal, derives its display string (password masking,
//! placeholder when empty), and installs a focused-key handler implementing
//! the editing state machine: arrows and Home/End move the caret,
//! Backspace/Delete edit, Enter submits, Escape cancels, printable keys
//! insert at the caret up to `max_length`.

use std::rc::Rc;

use spark_signals::{signal, PropValue, Signal};

use crate::engine::arrays::{core, interaction, text as text_arrays, visual};
use crate::engine::{allocate_index, create_flex_node, get_current_parent_index, release_index};
use crate::state::keyboard::KeyboardEvent;
use crate::state::{focus, keyboard, mouse};
use crate::theme::{variant_bg, variant_fg};
use crate::types::{BorderStyle, ComponentKind};

use super::box_primitive::{bind_color, scoped_cleanup};
use super::types::{bind_prop, Cleanup, InputProps, SharedProp};

const DEFAULT_MASK: char = '•';

/// Create a single-line input bound to `props.value`.
pub fn input(mut props: InputProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_flex_node(index);

    core::set_kind(index, ComponentKind::Input);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent(index, Some(parent));
    }

    if let Some(visible) = props.visible.take() {
        match visible {
            PropValue::Static(v) => core::set_visible(index, v),
            PropValue::Signal(s) => core::set_visible_signal(index, &s),
            PropValue::Getter(g) => core::set_visible_getter(index, move || g()),
        }
    }

    // Local editing state: caret position in characters.
    let value = props.value.clone();
    let cursor: Signal<u16> = signal(char_len(&value.get()) as u16);

    {
        let cursor = cursor.clone();
        interaction::set_cursor_position_getter(index, move || cursor.get());
    }

    // Display string: masked in password mode, placeholder when empty.
    {
        let value = value.clone();
        let placeholder = props.placeholder.clone().unwrap_or_default();
        let password = props.password;
        let mask = props.mask_char.unwrap_or(DEFAULT_MASK);
        text_arrays::set_content_getter(index, move || {
            let v = value.get();
            if v.is_empty() {
                placeholder.clone()
            } else if password {
                mask.to_string().repeat(char_len(&v))
            } else {
                v
            }
        });
    }

    // Layout props.
    if let Some(v) = props.width.take() {
        bind_prop(&node.width, v);
    }
    if let Some(v) = props.height.take() {
        bind_prop(&node.height, v);
    }
    if let Some(v) = props.min_width.take() {
        bind_prop(&node.min_width, v);
    }
    if let Some(v) = props.max_width.take() {
        bind_prop(&node.max_width, v);
    }
    if let Some(p) = props.padding.take() {
        let shared = SharedProp::new(p);
        shared.bind_to(&node.padding_top);
        shared.bind_to(&node.padding_right);
        shared.bind_to(&node.padding_bottom);
        shared.bind_to(&node.padding_left);
    }
    if let Some(m) = props.margin.take() {
        let shared = SharedProp::new(m);
        shared.bind_to(&node.margin_top);
        shared.bind_to(&node.margin_right);
        shared.bind_to(&node.margin_bottom);
        shared.bind_to(&node.margin_left);
    }

    // Border.
    if let Some(border) = props.border.take() {
        let shared = SharedProp::new(border);
        match &shared {
            SharedProp::Static(v) => visual::set_border_style(index, *v),
            SharedProp::Signal(s) => {
                let s = s.clone();
                visual::set_border_style_getter(index, move || s.get());
            }
            SharedProp::Getter(g) => {
                let g = g.clone();
                visual::set_border_style_getter(index, move || g());
            }
        }
        for slot in [
            &node.border_top,
            &node.border_right,
            &node.border_bottom,
            &node.border_left,
        ] {
            match &shared {
                SharedProp::Static(v) => {
                    slot.set_value(if *v == BorderStyle::None { 0 } else { 1 })
                }
                SharedProp::Signal(s) => {
                    let s = s.clone();
                    slot.set_getter(move || if s.get() == BorderStyle::None { 0 } else { 1 });
                }
                SharedProp::Getter(g) => {
                    let g = g.clone();
                    slot.set_getter(move || if g() == BorderStyle::None { 0 } else { 1 });
                }
            }
        }
    }
    if let Some(bc) = props.border_color.take() {
        bind_color(
            bc,
            |v| visual::set_border_color(index, v),
            |g| visual::set_border_color_getter(index, move || g()),
        );
    }

    // Colors.
    match (props.fg.take(), props.variant) {
        (Some(fg), _) => bind_color(
            fg,
            |v| visual::set_fg(index, v),
            |g| visual::set_fg_getter(index, move || g()),
        ),
        (None, Some(variant)) => visual::set_fg_getter(index, move || variant_fg(variant)),
        (None, None) => {}
    }
    match (props.bg.take(), props.variant) {
        (Some(bg), _) => bind_color(
            bg,
            |v| visual::set_bg(index, v),
            |g| visual::set_bg_getter(index, move || g()),
        ),
        (None, Some(variant)) => visual::set_bg_getter(index, move || variant_bg(variant)),
        (None, None) => {}
    }

    // Inputs are always focusable.
    interaction::set_focusable(index, true);
    if let Some(tab_index) = props.tab_index {
        interaction::set_tab_index(index, tab_index);
    }

    // Editing state machine, active while focused.
    let key_cleanup: Box<dyn FnOnce()> = {
        let value = value.clone();
        let cursor = cursor.clone();
        let max_length = props.max_length;
        let on_change = props.on_change.clone();
        let on_submit = props.on_submit.clone();
        let on_cancel = props.on_cancel.clone();

        Box::new(keyboard::on_focused(index, move |event| {
            handle_edit_key(
                event,
                &value,
                &cursor,
                max_length,
                on_change.as_deref(),
                on_submit.as_deref(),
                on_cancel.as_deref(),
            )
        }))
    };

    // Click focuses the input; a user on_click runs after.
    let mouse_cleanup: Box<dyn FnOnce()> = {
        let user_click = props.on_click.clone();
        let click: Rc<dyn Fn(&mouse::MouseEvent)> = Rc::new(move |event: &mouse::MouseEvent| {
            focus::focus(index);
            if let Some(ref handler) = user_click {
                handler(event);
            }
        });
        let handlers = mouse::MouseHandlers {
            on_click: Some(click),
            on_scroll: props.on_scroll.clone(),
            ..Default::default()
        };
        Box::new(mouse::on_component(index, handlers))
    };

    let mut focus_cleanup: Option<Box<dyn FnOnce()>> = None;
    if props.on_focus.is_some() || props.on_blur.is_some() {
        let on_focus = props.on_focus.clone();
        let on_blur = props.on_blur.clone();
        focus_cleanup = Some(Box::new(focus::register_callbacks(
            index,
            focus::FocusCallbacks {
                on_focus: on_focus.map(|f| Box::new(move || f()) as Box<dyn Fn()>),
                on_blur: on_blur.map(|f| Box::new(move || f()) as Box<dyn Fn()>),
            },
        )));
    }

    if props.auto_focus {
        focus::focus(index);
    }

    scoped_cleanup(Box::new(move || {
        key_cleanup();
        mouse_cleanup();
        if let Some(f) = focus_cleanup {
            f();
        }
        mouse::cleanup_index(index);
        keyboard::cleanup_index(index);
        release_index(index);
    }))
}

// =============================================================================
// Editing state machine
// =============================================================================

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[allow(clippy::too_many_arguments)]
fn handle_edit_key(
    event: &KeyboardEvent,
    value: &Signal<String>,
    cursor: &Signal<u16>,
    max_length: Option<usize>,
    on_change: Option<&dyn Fn(&str)>,
    on_submit: Option<&dyn Fn(&str)>,
    on_cancel: Option<&dyn Fn()>,
) -> bool {
    if !event.is_press() {
        return false;
    }

    let current = value.get();
    let len = char_len(&current);
    let pos = (cursor.get() as usize).min(len);

    match event.key.as_str() {
        "ArrowLeft" => {
            cursor.set(pos.saturating_sub(1) as u16);
            true
        }
        "ArrowRight" => {
            cursor.set((pos + 1).min(len) as u16);
            true
        }
        "Home" => {
            cursor.set(0);
            true
        }
        "End" => {
            cursor.set(len as u16);
            true
        }
        "Backspace" => {
            if pos > 0 {
                let mut chars: Vec<char> = current.chars().collect();
                chars.remove(pos - 1);
                let next: String = chars.into_iter().collect();
                value.set(next.clone());
                cursor.set((pos - 1) as u16);
                if let Some(cb) = on_change {
                    cb(&next);
                }
            }
            true
        }
        "Delete" => {
            if pos < len {
                let mut chars: Vec<char> = current.chars().collect();
                chars.remove(pos);
                let next: String = chars.into_iter().collect();
                value.set(next.clone());
                if let Some(cb) = on_change {
                    cb(&next);
                }
            }
            true
        }
        "Enter" => {
            if let Some(cb) = on_submit {
                cb(&current);
            }
            true
        }
        "Escape" => {
            if let Some(cb) = on_cancel {
                cb();
            }
            true
        }
        _ => {
            let Some(ch) = event.printable_char() else {
                return false;
            };
            if let Some(max) = max_length {
                if len >= max {
                    return true;
                }
            }
            let mut chars: Vec<char> = current.chars().collect();
            chars.insert(pos, ch);
            let next: String = chars.into_iter().collect();
            value.set(next.clone());
            cursor.set((pos + 1) as u16);
            if let Some(cb) = on_change {
                cb(&next);
            }
            true
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reset_registry;
    use crate::state::focus::reset_focus_state;
    use crate::state::keyboard::{reset_keyboard_state, Modifiers};
    use std::cell::{Cell, RefCell};

    fn setup() {
        reset_registry();
        reset_focus_state();
        reset_keyboard_state();
        crate::state::mouse::reset_mouse_state();
    }

    fn press(key: &str) {
        let focused = focus::get_focused_index();
        keyboard::dispatch_focused(focused, &KeyboardEvent::new(key));
    }

    #[test]
    fn test_input_creation() {
        setup();

        let value = signal(String::new());
        let cleanup = input(InputProps::new(value));

        assert_eq!(core::get_kind(0), ComponentKind::Input);
        assert!(interaction::get_focusable(0));

        cleanup();
        assert_eq!(core::get_kind(0), ComponentKind::None);
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        setup();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            auto_focus: true,
            ..InputProps::new(value.clone())
        });

        for k in ["h", "e", "l", "l", "o"] {
            press(k);
        }
        assert_eq!(value.get(), "hello");
        assert_eq!(interaction::get_cursor_position(0), 5);
    }

    #[test]
    fn test_editing_scenario() {
        setup();

        let submitted = Rc::new(RefCell::new(Vec::<String>::new()));
        let s = submitted.clone();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            auto_focus: true,
            on_submit: Some(Rc::new(move |v: &str| {
                s.borrow_mut().push(v.to_string());
            })),
            ..InputProps::new(value.clone())
        });

        for k in ["h", "e", "l", "l", "o", "ArrowLeft", "Backspace", "Enter"] {
            press(k);
        }

        // ArrowLeft puts the caret at 4; Backspace removes the character
        // before it (the second 'l').
        assert_eq!(value.get(), "helo");
        assert_eq!(interaction::get_cursor_position(0), 3);
        assert_eq!(*submitted.borrow(), vec!["helo".to_string()]);
    }

    #[test]
    fn test_delete_at_cursor() {
        setup();

        let value = signal("abc".to_string());
        let _cleanup = input(InputProps {
            auto_focus: true,
            ..InputProps::new(value.clone())
        });

        press("Home");
        press("Delete");
        assert_eq!(value.get(), "bc");
        assert_eq!(interaction::get_cursor_position(0), 0);
    }

    #[test]
    fn test_home_end_bounds() {
        setup();

        let value = signal("abc".to_string());
        let _cleanup = input(InputProps {
            auto_focus: true,
            ..InputProps::new(value.clone())
        });

        press("Home");
        assert_eq!(interaction::get_cursor_position(0), 0);
        press("ArrowLeft");
        assert_eq!(interaction::get_cursor_position(0), 0);

        press("End");
        assert_eq!(interaction::get_cursor_position(0), 3);
        press("ArrowRight");
        assert_eq!(interaction::get_cursor_position(0), 3);
    }

    #[test]
    fn test_max_length() {
        setup();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            auto_focus: true,
            max_length: Some(3),
            ..InputProps::new(value.clone())
        });

        for k in ["a", "b", "c", "d", "e"] {
            press(k);
        }
        assert_eq!(value.get(), "abc");
    }

    #[test]
    fn test_on_change_fires_per_edit() {
        setup();

        let changes = Rc::new(Cell::new(0));
        let c = changes.clone();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            auto_focus: true,
            on_change: Some(Rc::new(move |_| c.set(c.get() + 1))),
            ..InputProps::new(value.clone())
        });

        press("a");
        press("b");
        press("Backspace");
        assert_eq!(changes.get(), 3);

        // Backspace at position 0 changes nothing further.
        press("Backspace");
        press("Backspace");
        assert_eq!(changes.get(), 4);
    }

    #[test]
    fn test_escape_cancels() {
        setup();

        let cancelled = Rc::new(Cell::new(false));
        let c = cancelled.clone();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            auto_focus: true,
            on_cancel: Some(Rc::new(move || c.set(true))),
            ..InputProps::new(value)
        });

        press("Escape");
        assert!(cancelled.get());
    }

    #[test]
    fn test_password_masking() {
        setup();

        let value = signal("secret".to_string());
        let _cleanup = input(InputProps {
            password: true,
            ..InputProps::new(value)
        });

        assert_eq!(text_arrays::get_content(0), "••••••");
    }

    #[test]
    fn test_placeholder_when_empty() {
        setup();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            placeholder: Some("type here".to_string()),
            ..InputProps::new(value.clone())
        });

        assert_eq!(text_arrays::get_content(0), "type here");

        value.set("x".to_string());
        assert_eq!(text_arrays::get_content(0), "x");
    }

    #[test]
    fn test_modified_keys_not_inserted() {
        setup();

        let value = signal(String::new());
        let _cleanup = input(InputProps {
            auto_focus: true,
            ..InputProps::new(value.clone())
        });

        let focused = focus::get_focused_index();
        keyboard::dispatch_focused(
            focused,
            &KeyboardEvent::with_modifiers("a", Modifiers::ctrl()),
        );
        assert_eq!(value.get(), "");
    }
}
