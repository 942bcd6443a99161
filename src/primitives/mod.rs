//! Primitives — `box_primitive`, `text`, `input`.
//!
//! Every primitive follows the same recipe: allocate an index, write the
//! supplied props into the parallel arrays (and only those), build children
//! under a balanced parent context, register input handlers, and return a
//! cleanup handle that unwinds everything. When an effect scope is active
//! the cleanup also registers there, so dropping the scope drops the
//! subtree.

mod box_primitive;
mod input;
mod text;
pub mod types;

pub use box_primitive::box_primitive;
pub use input::input;
pub use text::text;

/// The three prop shapes: literal value, signal, or zero-arg getter.
pub use spark_signals::PropValue;
pub use types::{
    BlurCallback, BoxProps, Cleanup, FocusCallback, InputCancelCallback, InputChangeCallback,
    InputProps, InputSubmitCallback, KeyCallback, MouseCallback, MouseCallbackConsuming, TextProps,
};
