//! Text primitive — display-only text with styling and wrapping.

use spark_signals::PropValue;

use crate::engine::arrays::{core, interaction, text as text_arrays, visual};
use crate::engine::{allocate_index, create_flex_node, get_current_parent_index, release_index};
use crate::state::{focus, keyboard, mouse};
use crate::theme::{variant_bg, variant_fg};
use crate::types::ComponentKind;

use super::box_primitive::{bind_color, scoped_cleanup};
use super::types::{bind_mapped, bind_prop, Cleanup, SharedProp, TextProps};

/// Create a text component. Text cannot have children.
pub fn text(mut props: TextProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_flex_node(index);

    core::set_kind(index, ComponentKind::Text);
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

    // Content is the one required prop.
    match props.content {
        PropValue::Static(v) => text_arrays::set_content(index, v),
        PropValue::Signal(ref s) => text_arrays::set_content_signal(index, s),
        PropValue::Getter(g) => text_arrays::set_content_getter(index, move || g()),
    }

    // Text styling.
    if let Some(attrs) = props.attrs.take() {
        match attrs {
            PropValue::Static(v) => text_arrays::set_attrs(index, v),
            PropValue::Signal(s) => text_arrays::set_attrs_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_attrs_getter(index, move || g()),
        }
    }
    if let Some(align) = props.align.take() {
        match align {
            PropValue::Static(v) => text_arrays::set_align(index, v),
            PropValue::Signal(s) => text_arrays::set_align_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_align_getter(index, move || g()),
        }
    }
    if let Some(wrap) = props.wrap.take() {
        match wrap {
            PropValue::Static(v) => text_arrays::set_wrap(index, v),
            PropValue::Signal(s) => text_arrays::set_wrap_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_wrap_getter(index, move || g()),
        }
    }
    if let Some(glyph) = props.ellipsis.take() {
        text_arrays::set_ellipsis(index, glyph);
    }

    // Flex item props.
    if let Some(grow) = props.grow.take() {
        bind_prop(&node.flex_grow, grow);
    }
    if let Some(shrink) = props.shrink.take() {
        bind_prop(&node.flex_shrink, shrink);
    }
    if let Some(basis) = props.flex_basis.take() {
        bind_prop(&node.flex_basis, basis);
    }
    if let Some(align) = props.align_self.take() {
        bind_mapped(&node.align_self, align, |v| v as u8);
    }

    // Dimensions.
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
    if let Some(v) = props.min_height.take() {
        bind_prop(&node.min_height, v);
    }
    if let Some(v) = props.max_height.take() {
        bind_prop(&node.max_height, v);
    }

    // Padding.
    if let Some(p) = props.padding.take() {
        let shared = SharedProp::new(p);
        if props.padding_top.is_none() {
            shared.bind_to(&node.padding_top);
        }
        if props.padding_right.is_none() {
            shared.bind_to(&node.padding_right);
        }
        if props.padding_bottom.is_none() {
            shared.bind_to(&node.padding_bottom);
        }
        if props.padding_left.is_none() {
            shared.bind_to(&node.padding_left);
        }
    }
    if let Some(v) = props.padding_top.take() {
        bind_prop(&node.padding_top, v);
    }
    if let Some(v) = props.padding_right.take() {
        bind_prop(&node.padding_right, v);
    }
    if let Some(v) = props.padding_bottom.take() {
        bind_prop(&node.padding_bottom, v);
    }
    if let Some(v) = props.padding_left.take() {
        bind_prop(&node.padding_left, v);
    }

    // Colors (variant fills the gaps).
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
    if let Some(opacity) = props.opacity.take() {
        match opacity {
            PropValue::Static(v) => visual::set_opacity(index, v),
            PropValue::Signal(s) => visual::set_opacity_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_opacity_getter(index, move || g()),
        }
    }

    // Interaction (selectable / clickable text).
    let focusable = props.focusable.unwrap_or(false);
    if focusable {
        interaction::set_focusable(index, true);
        if let Some(tab_index) = props.tab_index {
            interaction::set_tab_index(index, tab_index);
        }
    }

    let mut mouse_cleanup: Option<Box<dyn FnOnce()>> = None;
    if let Some(on_click) = props.on_click.clone() {
        let handlers = mouse::MouseHandlers {
            on_click: Some(on_click),
            ..Default::default()
        };
        mouse_cleanup = Some(Box::new(mouse::on_component(index, handlers)));
    }

    let mut key_cleanup: Option<Box<dyn FnOnce()>> = None;
    if focusable {
        if let Some(on_key) = props.on_key.clone() {
            key_cleanup = Some(Box::new(keyboard::on_focused(index, move |event| {
                on_key(event)
            })));
        }
    }

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

    scoped_cleanup(Box::new(move || {
        if let Some(f) = mouse_cleanup {
            f();
        }
        if let Some(f) = key_cleanup {
            f();
        }
        if let Some(f) = focus_cleanup {
            f();
        }
        mouse::cleanup_index(index);
        keyboard::cleanup_index(index);
        release_index(index);
    }))
}

// =============================================================================
// Tests
// =============================================================================
