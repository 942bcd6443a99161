//! Box primitive — the container component.
//!
//! Follows the shared primitive recipe: allocate an index, write only the
//! supplied props into the columns, build children inside this box's parent
//! context, register handlers, and hand back a cleanup that unwinds it all.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{get_current_scope, on_scope_dispose, PropValue};

use crate::engine::arrays::{core, interaction, visual};
use crate::engine::{
    allocate_index, create_flex_node, get_current_parent_index, pop_parent_context,
    push_parent_context, release_index, FlexNode,
};
use crate::state::{focus, keyboard, mouse};
use crate::theme::{variant_bg, variant_fg};
use crate::types::{BorderStyle, ComponentKind, Rgba};

use super::types::{bind_mapped, bind_prop, BoxProps, Cleanup, SharedProp};

// =============================================================================
// Shared helpers (used by text and input too)
// =============================================================================

/// Balanced parent-context push/pop, held across the children closure so the
/// pop happens on every exit path.
pub(crate) struct ParentGuard;

impl ParentGuard {
    pub(crate) fn enter(index: usize) -> Self {
        push_parent_context(index);
        Self
    }
}

impl Drop for ParentGuard {
    fn drop(&mut self) {
        pop_parent_context();
    }
}

/// Wrap a cleanup so the ambient effect scope (when one is active) and the
/// returned handle can both fire it, whichever comes first.
pub(crate) fn scoped_cleanup(cleanup: Box<dyn FnOnce()>) -> Cleanup {
    let cell: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(Some(cleanup)));

    if get_current_scope().is_some() {
        let cell_for_scope = cell.clone();
        on_scope_dispose(move || {
            if let Some(f) = cell_for_scope.borrow_mut().take() {
                f();
            }
        });
    }

    Box::new(move || {
        if let Some(f) = cell.borrow_mut().take() {
            f();
        }
    })
}

/// Bind a color prop into the visual columns.
pub(crate) fn bind_color(
    prop: PropValue<Rgba>,
    set_static: impl Fn(Rgba),
    set_getter: impl Fn(Box<dyn Fn() -> Rgba>),
) {
    match prop {
        PropValue::Static(v) => set_static(v),
        PropValue::Signal(s) => set_getter(Box::new(move || s.get())),
        PropValue::Getter(g) => set_getter(Box::new(move || g())),
    }
}

/// Border width for layout: 1 cell for any style but None.
fn bind_border_width(shared: &SharedProp<BorderStyle>, slot: &spark_signals::TrackedSlot<u16>) {
    match shared {
        SharedProp::Static(v) => slot.set_value(if *v == BorderStyle::None { 0 } else { 1 }),
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

/// Bind dimensions/spacing/flex props shared by every primitive kind.
pub(crate) fn bind_dimension_props(node: &FlexNode, props: &mut BoxProps) {
    if let Some(w) = props.width.take() {
        bind_prop(&node.width, w);
    }
    if let Some(h) = props.height.take() {
        bind_prop(&node.height, h);
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
}

// =============================================================================
// Box
// =============================================================================

/// Create a box container. Returns the cleanup handle that releases the
/// subtree.
pub fn box_primitive(mut props: BoxProps) -> Cleanup {
    // 1. Allocate and create the layout node.
    let index = allocate_index(props.id.as_deref());
    let node = create_flex_node(index);

    // 2. Kind and parent (parent is fixed before the subtree builds).
    core::set_kind(index, ComponentKind::Box);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent(index, Some(parent));
    }

    // 3. Visibility.
    if let Some(visible) = props.visible.take() {
        match visible {
            PropValue::Static(v) => core::set_visible(index, v),
            PropValue::Signal(s) => core::set_visible_signal(index, &s),
            PropValue::Getter(g) => core::set_visible_getter(index, move || g()),
        }
    }

    // 4. Container layout props (enum props go through the lazy converter).
    if let Some(dir) = props.flex_direction.take() {
        bind_mapped(&node.flex_direction, dir, |v| v as u8);
    }
    if let Some(wrap) = props.flex_wrap.take() {
        bind_mapped(&node.flex_wrap, wrap, |v| v as u8);
    }
    if let Some(justify) = props.justify_content.take() {
        bind_mapped(&node.justify_content, justify, |v| v as u8);
    }
    if let Some(align) = props.align_items.take() {
        bind_mapped(&node.align_items, align, |v| v as u8);
    }
    if let Some(align) = props.align_content.take() {
        bind_mapped(&node.align_content, align, |v| v as u8);
    }

    // 5. Item props.
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
    if let Some(order) = props.order.take() {
        bind_prop(&node.order, order);
    }

    // 6. Dimensions.
    bind_dimension_props(&node, &mut props);

    // 7. Spacing. Shorthands fan out to the sides no explicit prop covers.
    if let Some(m) = props.margin.take() {
        let shared = SharedProp::new(m);
        if props.margin_top.is_none() {
            shared.bind_to(&node.margin_top);
        }
        if props.margin_right.is_none() {
            shared.bind_to(&node.margin_right);
        }
        if props.margin_bottom.is_none() {
            shared.bind_to(&node.margin_bottom);
        }
        if props.margin_left.is_none() {
            shared.bind_to(&node.margin_left);
        }
    }
    if let Some(v) = props.margin_top.take() {
        bind_prop(&node.margin_top, v);
    }
    if let Some(v) = props.margin_right.take() {
        bind_prop(&node.margin_right, v);
    }
    if let Some(v) = props.margin_bottom.take() {
        bind_prop(&node.margin_bottom, v);
    }
    if let Some(v) = props.margin_left.take() {
        bind_prop(&node.margin_left, v);
    }

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

    if let Some(g) = props.gap.take() {
        let shared = SharedProp::new(g);
        shared.bind_to(&node.gap);
        if props.row_gap.is_none() {
            shared.bind_to(&node.row_gap);
        }
        if props.column_gap.is_none() {
            shared.bind_to(&node.column_gap);
        }
    }
    if let Some(v) = props.row_gap.take() {
        bind_prop(&node.row_gap, v);
    }
    if let Some(v) = props.column_gap.take() {
        bind_prop(&node.column_gap, v);
    }

    // 8. Positioning and overflow.
    if let Some(position) = props.position.take() {
        bind_mapped(&node.position, position, |v| v as u8);
    }
    if let Some(v) = props.top.take() {
        bind_prop(&node.inset_top, v);
    }
    if let Some(v) = props.right.take() {
        bind_prop(&node.inset_right, v);
    }
    if let Some(v) = props.bottom.take() {
        bind_prop(&node.inset_bottom, v);
    }
    if let Some(v) = props.left.take() {
        bind_prop(&node.inset_left, v);
    }
    if let Some(overflow) = props.overflow.take() {
        bind_mapped(&node.overflow, overflow, |v| v as u8);
    }

    // 9. Borders: style feeds the renderer, width (0/1) feeds layout.
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
        if props.border_top.is_none() {
            bind_border_width(&shared, &node.border_top);
        }
        if props.border_right.is_none() {
            bind_border_width(&shared, &node.border_right);
        }
        if props.border_bottom.is_none() {
            bind_border_width(&shared, &node.border_bottom);
        }
        if props.border_left.is_none() {
            bind_border_width(&shared, &node.border_left);
        }
    }
    let side_borders = [
        (props.border_top.take(), 0u8),
        (props.border_right.take(), 1u8),
        (props.border_bottom.take(), 2u8),
        (props.border_left.take(), 3u8),
    ];
    for (prop, side) in side_borders {
        let Some(prop) = prop else { continue };
        let shared = SharedProp::new(prop);
        if let SharedProp::Static(v) = &shared {
            visual::set_side_border_style(index, side, *v);
        }
        let slot = match side {
            0 => &node.border_top,
            1 => &node.border_right,
            2 => &node.border_bottom,
            _ => &node.border_left,
        };
        bind_border_width(&shared, slot);
    }
    if let Some(bc) = props.border_color.take() {
        bind_color(
            bc,
            |v| visual::set_border_color(index, v),
            |g| visual::set_border_color_getter(index, move || g()),
        );
    }

    // 10. Colors. An absent color prop with a variant binds a theme getter,
    // so theme swaps re-trigger dependents without recreating components.
    match (props.fg.take(), props.variant) {
        (Some(fg), _) => bind_color(
            fg,
            |v| visual::set_fg(index, v),
            |g| visual::set_fg_getter(index, move || g()),
        ),
        (None, Some(variant)) => {
            visual::set_fg_getter(index, move || variant_fg(variant));
        }
        (None, None) => {}
    }
    match (props.bg.take(), props.variant) {
        (Some(bg), _) => bind_color(
            bg,
            |v| visual::set_bg(index, v),
            |g| visual::set_bg_getter(index, move || g()),
        ),
        (None, Some(variant)) => {
            visual::set_bg_getter(index, move || variant_bg(variant));
        }
        (None, None) => {}
    }
    if let Some(opacity) = props.opacity.take() {
        match opacity {
            PropValue::Static(v) => visual::set_opacity(index, v),
            PropValue::Signal(s) => visual::set_opacity_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_opacity_getter(index, move || g()),
        }
    }
    if let Some(z) = props.z_index.take() {
        match z {
            PropValue::Static(v) => visual::set_z_index(index, v),
            PropValue::Signal(s) => visual::set_z_index_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_z_index_getter(index, move || g()),
        }
    }

    // 11. Interaction columns.
    let focusable = props.focusable.unwrap_or(false);
    if focusable {
        interaction::set_focusable(index, true);
        if let Some(tab_index) = props.tab_index {
            interaction::set_tab_index(index, tab_index);
        }
    }
    if let Some(enabled) = props.mouse_enabled {
        interaction::set_mouse_enabled(index, enabled);
    }

    // 12. Mouse handlers (with click-to-focus for focusable boxes).
    let has_mouse_handlers = props.on_click.is_some()
        || props.on_mouse_down.is_some()
        || props.on_mouse_up.is_some()
        || props.on_mouse_enter.is_some()
        || props.on_mouse_leave.is_some()
        || props.on_scroll.is_some();

    let mut mouse_cleanup: Option<Box<dyn FnOnce()>> = None;
    if focusable || has_mouse_handlers {
        let user_click = props.on_click.clone();
        let click: Option<Rc<dyn Fn(&mouse::MouseEvent)>> = if focusable {
            Some(Rc::new(move |event: &mouse::MouseEvent| {
                focus::focus(index);
                if let Some(ref handler) = user_click {
                    handler(event);
                }
            }))
        } else {
            props.on_click.clone()
        };

        let handlers = mouse::MouseHandlers {
            on_mouse_down: props.on_mouse_down.clone(),
            on_mouse_up: props.on_mouse_up.clone(),
            on_click: click,
            on_mouse_enter: props.on_mouse_enter.clone(),
            on_mouse_leave: props.on_mouse_leave.clone(),
            on_scroll: props.on_scroll.clone(),
        };
        mouse_cleanup = Some(Box::new(mouse::on_component(index, handlers)));
    }

    // 13. Keyboard and focus callbacks.
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

    // 14. Children build inside this box's parent context; the guard pops
    // the stack on every exit path.
    if let Some(children) = props.children.take() {
        let _guard = ParentGuard::enter(index);
        children();
    }

    // 15. Cleanup handle.
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
