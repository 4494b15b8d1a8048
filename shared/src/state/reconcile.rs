use std::{mem, sync::Arc};

use super::value::StateValue;

/// Merges a freshly dispatched state with the one it replaces.
///
/// Every value of `new_state` that deep-equals its counterpart in `old_state`
/// is swapped for the old reference, recursively. When nothing changed at all
/// the old state itself is returned. Keys missing from `new_state` are dropped.
///
/// The outer tables and lists of `new_state` are reused in place only while
/// the caller holds no other reference to them. Otherwise they are copied
/// before the swap: the result deep-equals `new_state` and shares the
/// unchanged sub-trees of `old_state`, but is not `new_state` itself.
pub fn reconcile(new_state: StateValue, old_state: &StateValue) -> StateValue {
    if new_state.same(old_state) {
        return old_state.clone();
    }

    match (new_state, old_state) {
        (StateValue::Table(mut new_table), StateValue::Table(old_table)) => {
            let mut unchanged = new_table.len() == old_table.len();
            let entries = Arc::make_mut(&mut new_table);
            for (key, value) in entries.iter_mut() {
                let Some(old_value) = old_table.get(key) else {
                    unchanged = false;
                    continue;
                };
                let merged = reconcile(mem::take(value), old_value);
                unchanged &= merged.same(old_value);
                *value = merged;
            }

            if unchanged {
                old_state.clone()
            } else {
                StateValue::Table(new_table)
            }
        }
        (StateValue::List(mut new_items), StateValue::List(old_items)) => {
            let mut unchanged = new_items.len() == old_items.len();
            let items = Arc::make_mut(&mut new_items);
            for (value, old_value) in items.iter_mut().zip(old_items.iter()) {
                let merged = reconcile(mem::take(value), old_value);
                unchanged &= merged.same(old_value);
                *value = merged;
            }

            if unchanged {
                old_state.clone()
            } else {
                StateValue::List(new_items)
            }
        }
        (new_state, old_state) => {
            if new_state == *old_state {
                old_state.clone()
            } else {
                new_state
            }
        }
    }
}
