//! Engine — component registry and parallel arrays.
//!
//! Components are not objects. They are indices into columnar arrays:
//!
//! ```text
//! Index 0: Box  (parent=-1, width=80,   visible=true)
//! Index 1: Text (parent=0,  width=auto, visible=true)
//! Index 2: Box  (parent=0,  width=40,   visible=false)
//! ```
//!
//! Every cell is a stable reactive slot: binding a new source mutates the
//! cell in place, so deriveds keep their subscription across prop swaps.

pub mod arrays;
mod flex_node;
mod flex_registry;
mod registry;

pub use flex_node::*;
pub use flex_registry::*;
pub use registry::*;
