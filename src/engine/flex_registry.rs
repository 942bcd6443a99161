//! FlexNode lifecycle: index → node mapping.
//!
//! Primitives create a node right after `allocate_index()`; `release_index()`
//! destroys it, disconnecting all slot sources.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::flex_node::FlexNode;

thread_local! {
    static FLEX_NODES: RefCell<HashMap<usize, Rc<FlexNode>>> = RefCell::new(HashMap::new());
}

/// Create (or fetch) the FlexNode for a component index.
pub fn create_flex_node(index: usize) -> Rc<FlexNode> {
    FLEX_NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        if let Some(node) = nodes.get(&index) {
            return node.clone();
        }
        let node = Rc::new(FlexNode::new(index));
        nodes.insert(index, node.clone());
        node
    })
}

/// Disconnect and drop the FlexNode for a released index.
pub fn destroy_flex_node(index: usize) {
    FLEX_NODES.with(|nodes| {
        if let Some(node) = nodes.borrow_mut().remove(&index) {
            node.disconnect();
        }
    });
}

/// FlexNode for an index, if one exists.
pub fn get_flex_node(index: usize) -> Option<Rc<FlexNode>> {
    FLEX_NODES.with(|nodes| nodes.borrow().get(&index).cloned())
}

pub fn flex_node_count() -> usize {
    FLEX_NODES.with(|nodes| nodes.borrow().len())
}

/// Disconnect everything and empty the registry.
pub fn reset_flex_nodes() {
    FLEX_NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        for node in nodes.values() {
            node.disconnect();
        }
        nodes.clear();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    #[test]
    fn test_create_is_idempotent() {
        reset_flex_nodes();

        let a = create_flex_node(0);
        let b = create_flex_node(0);
        assert_eq!(Rc::as_ptr(&a), Rc::as_ptr(&b));
        assert_eq!(flex_node_count(), 1);
    }

    #[test]
    fn test_destroy_disconnects() {
        reset_flex_nodes();

        let node = create_flex_node(3);
        node.width.set_value(Dimension::Cells(10));

        destroy_flex_node(3);
        assert!(get_flex_node(3).is_none());
        assert_eq!(flex_node_count(), 0);
        // The Rc we still hold was reset to defaults.
        assert_eq!(node.width.get(), Some(Dimension::Auto));
    }
}
