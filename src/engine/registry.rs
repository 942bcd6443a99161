//! Component registry — index allocation for the parallel arrays.
//!
//! - id ↔ index mapping (id map is reactive so lookups can subscribe)
//! - LIFO free pool for O(1) index reuse
//! - `ReactiveSet` of allocated indices (deriveds react to add/remove)
//! - Parent-context stack used while building component trees
//! - Destroy callbacks, run on release before the arrays are cleared

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use spark_signals::{ReactiveMap, ReactiveSet};

use super::arrays;
use super::flex_registry;

// =============================================================================
// Registry state
// =============================================================================

thread_local! {
    /// Component id → array index.
    static ID_TO_INDEX: RefCell<ReactiveMap<String, usize>> = RefCell::new(ReactiveMap::new());

    /// Array index → component id.
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Currently allocated indices. Deriveds that iterate re-run on changes.
    static ALLOCATED: RefCell<ReactiveSet<usize>> = RefCell::new(ReactiveSet::new());

    /// Released indices awaiting reuse (LIFO).
    static FREE_POOL: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// High-water mark: next index when the pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generated ids.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Parent indices for nested component creation.
    static PARENT_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Destroy callbacks per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> =
        RefCell::new(HashMap::new());

    // One-shot warning flags (programmer errors warn once per process).
    static WARNED_DOUBLE_RELEASE: Cell<bool> = const { Cell::new(false) };
    static WARNED_STACK_UNDERFLOW: Cell<bool> = const { Cell::new(false) };
}

// =============================================================================
// Parent context stack
// =============================================================================

/// Current parent index, or None at the root.
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

/// Pop the parent stack. Popping an empty stack is a warned no-op.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        if stack.borrow_mut().pop().is_none() {
            WARNED_STACK_UNDERFLOW.with(|flag| {
                if !flag.get() {
                    flag.set(true);
                    log::warn!("pop_parent_context called with empty parent stack");
                }
            });
        }
    });
}

/// Depth of the parent stack (steady state between mounts is 0).
pub fn parent_stack_depth() -> usize {
    PARENT_STACK.with(|stack| stack.borrow().len())
}

// =============================================================================
// Index allocation
// =============================================================================

/// Allocate an index for a new component.
///
/// If `id` is already registered its existing index is returned. Without an
/// id one is generated.
pub fn allocate_index(id: Option<&str>) -> usize {
    let component_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("c{}", *counter);
            *counter += 1;
            id
        }),
    };

    let existing = ID_TO_INDEX.with(|map| map.borrow().get(&component_id).copied());
    if let Some(index) = existing {
        return index;
    }

    let index = FREE_POOL.with(|free| {
        free.borrow_mut().pop().unwrap_or_else(|| {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        })
    });

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().insert(component_id.clone(), index);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().insert(index, component_id.clone());
    });
    ALLOCATED.with(|set| {
        set.borrow_mut().insert(index);
    });

    // Grow every column namespace to cover the new index.
    arrays::ensure_all_capacity(index);
    arrays::core::set_id(index, component_id);

    index
}

/// Release an index back to the pool.
///
/// Children are released first (recursively), then destroy callbacks run,
/// then every column at the index is reset. Releasing an index that is not
/// allocated is a warned no-op.
pub fn release_index(index: usize) {
    let id = INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned());
    let Some(id) = id else {
        WARNED_DOUBLE_RELEASE.with(|flag| {
            if !flag.get() {
                flag.set(true);
                log::warn!("release_index({index}) on an unallocated index");
            }
        });
        return;
    };

    // Collect children first: the set is mutated while releasing.
    let children: Vec<usize> = ALLOCATED.with(|set| {
        set.borrow()
            .iter()
            .copied()
            .filter(|&child| arrays::core::get_parent(child) == Some(index))
            .collect()
    });
    for child in children {
        release_index(child);
    }

    run_destroy_callbacks(index);

    flex_registry::destroy_flex_node(index);

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&id);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().remove(&index);
    });
    ALLOCATED.with(|set| {
        set.borrow_mut().remove(&index);
    });

    arrays::clear_all_at_index(index);

    FREE_POOL.with(|free| free.borrow_mut().push(index));

    // Reset-on-zero: with the last component gone, return the arrays and the
    // pool to their initial state.
    let is_empty = ALLOCATED.with(|set| set.borrow().is_empty());
    if is_empty {
        arrays::reset_all_arrays();
        flex_registry::reset_flex_nodes();
        crate::layout::reset_layout_cache();
        FREE_POOL.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

// =============================================================================
// Destroy callbacks
// =============================================================================

/// Register a callback to run when `index` is released.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            // A panicking user callback must not interrupt sibling cleanups.
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                log::warn!("destroy callback for component {index} panicked");
            }
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Index for a component id (reactive read).
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Id for an index.
pub fn get_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// All allocated indices. Iterating inside a derived subscribes it to
/// allocation changes.
pub fn get_allocated_indices() -> Vec<usize> {
    ALLOCATED.with(|set| set.borrow().iter().copied().collect())
}

pub fn is_allocated(index: usize) -> bool {
    ALLOCATED.with(|set| set.borrow().contains(&index))
}

pub fn get_allocated_count() -> usize {
    ALLOCATED.with(|set| set.borrow().len())
}

/// High-water mark: length every ComputedLayout array must cover.
pub fn get_high_water_mark() -> usize {
    NEXT_INDEX.with(|next| *next.borrow())
}

// =============================================================================
// Reset (tests)
// =============================================================================

/// Reset all registry state.
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    ALLOCATED.with(|set| set.borrow_mut().clear());
    FREE_POOL.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
    flex_registry::reset_flex_nodes();
    arrays::reset_all_arrays();
    crate::layout::reset_layout_cache();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_allocate_sequential() {
        reset_registry();

        assert_eq!(allocate_index(None), 0);
        assert_eq!(allocate_index(None), 1);
        assert_eq!(allocate_index(Some("panel")), 2);

        assert!(is_allocated(0));
        assert!(is_allocated(2));
        assert!(!is_allocated(3));
        assert_eq!(get_allocated_count(), 3);
    }

    #[test]
    fn test_release_and_reuse_lifo() {
        reset_registry();

        let a = allocate_index(None);
        let _b = allocate_index(None);

        release_index(a);
        assert!(!is_allocated(a));

        // The freed index comes back first.
        assert_eq!(allocate_index(None), a);
    }

    #[test]
    fn test_release_unallocated_is_noop() {
        reset_registry();

        let a = allocate_index(None);
        release_index(99);
        assert!(is_allocated(a));
        assert_eq!(get_allocated_count(), 1);
    }

    #[test]
    fn test_id_mapping() {
        reset_registry();

        let idx = allocate_index(Some("sidebar"));
        assert_eq!(get_index("sidebar"), Some(idx));
        assert_eq!(get_id(idx), Some("sidebar".to_string()));

        // Same id resolves to the same index.
        assert_eq!(allocate_index(Some("sidebar")), idx);
    }

    #[test]
    fn test_parent_stack() {
        reset_registry();

        assert_eq!(get_current_parent_index(), None);

        push_parent_context(5);
        push_parent_context(10);
        assert_eq!(get_current_parent_index(), Some(10));

        pop_parent_context();
        assert_eq!(get_current_parent_index(), Some(5));

        pop_parent_context();
        assert_eq!(get_current_parent_index(), None);
        assert_eq!(parent_stack_depth(), 0);

        // Underflow is a no-op.
        pop_parent_context();
        assert_eq!(parent_stack_depth(), 0);
    }

    #[test]
    fn test_destroy_callback_runs_once() {
        reset_registry();

        let called = Rc::new(Cell::new(0));
        let called_clone = called.clone();

        let idx = allocate_index(None);
        on_destroy(idx, move || {
            called_clone.set(called_clone.get() + 1);
        });

        release_index(idx);
        assert_eq!(called.get(), 1);

        // Double release does not re-run callbacks.
        release_index(idx);
        assert_eq!(called.get(), 1);
    }

    #[test]
    fn test_panicking_callback_does_not_stop_siblings() {
        reset_registry();

        let survived = Rc::new(Cell::new(false));
        let survived_clone = survived.clone();

        let idx = allocate_index(None);
        on_destroy(idx, || panic!("user bug"));
        on_destroy(idx, move || survived_clone.set(true));

        release_index(idx);
        assert!(survived.get());
    }

    #[test]
    fn test_recursive_release() {
        reset_registry();

        let parent = allocate_index(None);
        let child = allocate_index(None);
        let grandchild = allocate_index(None);
        arrays::core::set_parent(child, Some(parent));
        arrays::core::set_parent(grandchild, Some(child));

        release_index(parent);

        assert!(!is_allocated(parent));
        assert!(!is_allocated(child));
        assert!(!is_allocated(grandchild));
    }

    #[test]
    fn test_reset_on_zero() {
        reset_registry();

        let a = allocate_index(None);
        let b = allocate_index(None);
        release_index(a);
        release_index(b);

        assert_eq!(get_allocated_count(), 0);
        // Free pool was cleared and the high-water mark reset: allocation
        // starts over from 0.
        assert_eq!(get_high_water_mark(), 0);
        assert_eq!(allocate_index(None), 0);
    }
}
