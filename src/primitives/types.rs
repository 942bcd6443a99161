//! Prop types for the primitives.
//!
//! Props accept three shapes — a literal value, a `Signal`, or a zero-arg
//! getter — via `spark_signals::PropValue`. Binding a prop swaps the source
//! of the target slot in place, so reactivity survives without ever
//! replacing the cell.

use std::rc::Rc;

use spark_signals::{PropValue, Signal, TrackedSlot};

use crate::state::keyboard::KeyboardEvent;
use crate::state::mouse::MouseEvent;
use crate::theme::Variant;
use crate::types::{
    AlignContent, AlignItems, AlignSelf, Attr, BorderStyle, Dimension, FlexDirection, FlexWrap,
    JustifyContent, Overflow, Position, Rgba, TextAlign, TextWrap,
};

// =============================================================================
// Cleanup
// =============================================================================

/// Cleanup handle returned by every primitive. Calling it unmounts the
/// component (and, for boxes, its subtree).
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callback types
// =============================================================================

/// Mouse callback shared between the registry and wrapper closures.
pub type MouseCallback = Rc<dyn Fn(&MouseEvent)>;

/// Mouse callback that may consume the event.
pub type MouseCallbackConsuming = Rc<dyn Fn(&MouseEvent) -> bool>;

/// Keyboard callback; return true to consume.
pub type KeyCallback = Rc<dyn Fn(&KeyboardEvent) -> bool>;

pub type FocusCallback = Rc<dyn Fn()>;
pub type BlurCallback = Rc<dyn Fn()>;

pub type InputChangeCallback = Rc<dyn Fn(&str)>;
pub type InputSubmitCallback = Rc<dyn Fn(&str)>;
pub type InputCancelCallback = Rc<dyn Fn()>;

// =============================================================================
// Prop binding helpers
// =============================================================================

/// Bind a same-typed prop straight into a slot.
pub(crate) fn bind_prop<T: Clone + PartialEq + 'static>(
    slot: &TrackedSlot<T>,
    prop: PropValue<T>,
) {
    slot.bind(prop);
}

/// Bind an enum prop into a u8 column through a lazy converter: reactive
/// sources are wrapped in a getter that maps on every read.
pub(crate) fn bind_mapped<T, F>(slot: &TrackedSlot<u8>, prop: PropValue<T>, map: F)
where
    T: Clone + PartialEq + 'static,
    F: Fn(T) -> u8 + Clone + 'static,
{
    match prop {
        PropValue::Static(v) => slot.set_value(map(v)),
        PropValue::Signal(s) => {
            let map = map.clone();
            slot.set_getter(move || map(s.get()));
        }
        PropValue::Getter(g) => {
            let map = map.clone();
            slot.set_getter(move || map(g()));
        }
    }
}

/// A prop normalized into a cloneable form so shorthand props (`margin`,
/// `padding`, `gap`) can fan out to several slots.
pub(crate) enum SharedProp<T: Clone + PartialEq + 'static> {
    Static(T),
    Signal(Signal<T>),
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> SharedProp<T> {
    pub(crate) fn new(prop: PropValue<T>) -> Self {
        match prop {
            PropValue::Static(v) => Self::Static(v),
            PropValue::Signal(s) => Self::Signal(s),
            PropValue::Getter(g) => Self::Getter(Rc::from(g)),
        }
    }

    pub(crate) fn bind_to(&self, slot: &TrackedSlot<T>) {
        match self {
            Self::Static(v) => slot.set_value(v.clone()),
            Self::Signal(s) => slot.set_signal(s),
            Self::Getter(g) => {
                let g = g.clone();
                slot.set_getter(move || g());
            }
        }
    }
}

// =============================================================================
// Box props
// =============================================================================

/// Properties for the box container primitive.
///
/// Only supplied props are bound; everything else keeps the column default.
#[derive(Default)]
pub struct BoxProps {
    /// Stable identifier; generated when omitted.
    pub id: Option<String>,

    /// Rendered and laid out only while true (default true).
    pub visible: Option<PropValue<bool>>,

    // Container layout.
    pub flex_direction: Option<PropValue<FlexDirection>>,
    pub flex_wrap: Option<PropValue<FlexWrap>>,
    pub justify_content: Option<PropValue<JustifyContent>>,
    pub align_items: Option<PropValue<AlignItems>>,
    pub align_content: Option<PropValue<AlignContent>>,

    // Item tuning.
    pub grow: Option<PropValue<f32>>,
    pub shrink: Option<PropValue<f32>>,
    pub flex_basis: Option<PropValue<Dimension>>,
    pub align_self: Option<PropValue<AlignSelf>>,
    pub order: Option<PropValue<i32>>,

    // Dimensions.
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub min_width: Option<PropValue<Dimension>>,
    pub max_width: Option<PropValue<Dimension>>,
    pub min_height: Option<PropValue<Dimension>>,
    pub max_height: Option<PropValue<Dimension>>,

    // Spacing. The shorthand applies to every side an explicit side prop
    // does not override.
    pub margin: Option<PropValue<u16>>,
    pub margin_top: Option<PropValue<u16>>,
    pub margin_right: Option<PropValue<u16>>,
    pub margin_bottom: Option<PropValue<u16>>,
    pub margin_left: Option<PropValue<u16>>,
    pub padding: Option<PropValue<u16>>,
    pub padding_top: Option<PropValue<u16>>,
    pub padding_right: Option<PropValue<u16>>,
    pub padding_bottom: Option<PropValue<u16>>,
    pub padding_left: Option<PropValue<u16>>,
    pub gap: Option<PropValue<u16>>,
    pub row_gap: Option<PropValue<u16>>,
    pub column_gap: Option<PropValue<u16>>,

    // Positioning.
    pub position: Option<PropValue<Position>>,
    pub top: Option<PropValue<Dimension>>,
    pub right: Option<PropValue<Dimension>>,
    pub bottom: Option<PropValue<Dimension>>,
    pub left: Option<PropValue<Dimension>>,

    pub overflow: Option<PropValue<Overflow>>,

    // Frame decorations.
    pub border: Option<PropValue<BorderStyle>>,
    pub border_top: Option<PropValue<BorderStyle>>,
    pub border_right: Option<PropValue<BorderStyle>>,
    pub border_bottom: Option<PropValue<BorderStyle>>,
    pub border_left: Option<PropValue<BorderStyle>>,
    pub border_color: Option<PropValue<Rgba>>,

    // Colors.
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub opacity: Option<PropValue<u8>>,
    /// Theme shortcut filling fg/bg when the explicit props are absent.
    pub variant: Option<Variant>,
    pub z_index: Option<PropValue<i32>>,

    // Interaction.
    pub focusable: Option<bool>,
    pub tab_index: Option<i32>,
    pub mouse_enabled: Option<bool>,

    // Mouse callbacks.
    pub on_click: Option<MouseCallback>,
    pub on_mouse_down: Option<MouseCallback>,
    pub on_mouse_up: Option<MouseCallback>,
    pub on_mouse_enter: Option<MouseCallback>,
    pub on_mouse_leave: Option<MouseCallback>,
    pub on_scroll: Option<MouseCallbackConsuming>,

    // Keyboard / focus callbacks.
    pub on_key: Option<KeyCallback>,
    pub on_focus: Option<FocusCallback>,
    pub on_blur: Option<BlurCallback>,

    /// Child builder; runs with this box as the parent context.
    pub children: Option<Box<dyn FnOnce()>>,
}

// =============================================================================
// Text props
// =============================================================================

/// Properties for the text primitive. Text cannot have children.
pub struct TextProps {
    pub id: Option<String>,

    /// The text content to display.
    pub content: PropValue<String>,

    pub visible: Option<PropValue<bool>>,

    // Text styling.
    pub attrs: Option<PropValue<Attr>>,
    pub align: Option<PropValue<TextAlign>>,
    pub wrap: Option<PropValue<TextWrap>>,
    /// Glyph appended when truncation clips the content.
    pub ellipsis: Option<String>,

    // Item tuning.
    pub grow: Option<PropValue<f32>>,
    pub shrink: Option<PropValue<f32>>,
    pub flex_basis: Option<PropValue<Dimension>>,
    pub align_self: Option<PropValue<AlignSelf>>,

    // Dimensions.
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub min_width: Option<PropValue<Dimension>>,
    pub max_width: Option<PropValue<Dimension>>,
    pub min_height: Option<PropValue<Dimension>>,
    pub max_height: Option<PropValue<Dimension>>,

    // Spacing.
    pub padding: Option<PropValue<u16>>,
    pub padding_top: Option<PropValue<u16>>,
    pub padding_right: Option<PropValue<u16>>,
    pub padding_bottom: Option<PropValue<u16>>,
    pub padding_left: Option<PropValue<u16>>,

    // Colors.
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub opacity: Option<PropValue<u8>>,
    pub variant: Option<Variant>,

    // Interaction.
    pub focusable: Option<bool>,
    pub tab_index: Option<i32>,

    pub on_click: Option<MouseCallback>,
    pub on_key: Option<KeyCallback>,
    pub on_focus: Option<FocusCallback>,
    pub on_blur: Option<BlurCallback>,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            id: None,
            content: PropValue::Static(String::new()),
            visible: None,
            attrs: None,
            align: None,
            wrap: None,
            ellipsis: None,
            grow: None,
            shrink: None,
            flex_basis: None,
            align_self: None,
            width: None,
            height: None,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
            padding: None,
            padding_top: None,
            padding_right: None,
            padding_bottom: None,
            padding_left: None,
            fg: None,
            bg: None,
            opacity: None,
            variant: None,
            focusable: None,
            tab_index: None,
            on_click: None,
            on_key: None,
            on_focus: None,
            on_blur: None,
        }
    }
}

// =============================================================================
// Input props
// =============================================================================

/// Properties for the single-line input primitive.
///
/// The value is a two-way bound signal: edits write through, external writes
/// show up immediately.
pub struct InputProps {
    pub id: Option<String>,

    /// Current value (required).
    pub value: Signal<String>,

    /// Shown while the value is empty.
    pub placeholder: Option<String>,

    /// Mask every character (password entry).
    pub password: bool,
    /// Mask character, default '•'.
    pub mask_char: Option<char>,

    /// Maximum value length in characters (None = unlimited).
    pub max_length: Option<usize>,

    /// Take focus as soon as the component mounts.
    pub auto_focus: bool,

    pub visible: Option<PropValue<bool>>,

    // Dimensions.
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub min_width: Option<PropValue<Dimension>>,
    pub max_width: Option<PropValue<Dimension>>,

    // Spacing.
    pub padding: Option<PropValue<u16>>,
    pub margin: Option<PropValue<u16>>,

    // Frame.
    pub border: Option<PropValue<BorderStyle>>,
    pub border_color: Option<PropValue<Rgba>>,

    // Colors.
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub variant: Option<Variant>,

    pub tab_index: Option<i32>,

    // Editing callbacks.
    pub on_change: Option<InputChangeCallback>,
    pub on_submit: Option<InputSubmitCallback>,
    pub on_cancel: Option<InputCancelCallback>,
    pub on_focus: Option<FocusCallback>,
    pub on_blur: Option<BlurCallback>,

    // Mouse callbacks.
    pub on_click: Option<MouseCallback>,
    pub on_scroll: Option<MouseCallbackConsuming>,
}

impl InputProps {
    /// InputProps with the required value signal and defaults elsewhere.
    pub fn new(value: Signal<String>) -> Self {
        Self {
            id: None,
            value,
            placeholder: None,
            password: false,
            mask_char: None,
            max_length: None,
            auto_focus: false,
            visible: None,
            width: None,
            height: None,
            min_width: None,
            max_width: None,
            padding: None,
            margin: None,
            border: None,
            border_color: None,
            fg: None,
            bg: None,
            variant: None,
            tab_index: None,
            on_change: None,
            on_submit: None,
            on_cancel: None,
            on_focus: None,
            on_blur: None,
            on_click: None,
            on_scroll: None,
        }
    }
}
