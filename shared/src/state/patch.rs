use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use super::value::{StateTable, StateValue};

/// A partial description of a state change
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatePatch {
    /// Replace the value at this position
    Set(StateValue),
    /// Remove the key at this position
    Remove,
    /// Descend into a table and patch individual keys
    Fields(BTreeMap<String, StatePatch>),
}

/// What travels in a `Dispatch` message: either a full hydration snapshot or
/// an incremental patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncPayload {
    Init(StateValue),
    Patch(StatePatch),
}

impl SyncPayload {
    pub fn is_init(&self) -> bool {
        matches!(self, SyncPayload::Init(_))
    }

    /// Produces the state that results from applying this payload on top of
    /// `current`
    pub fn apply_to(&self, current: &StateValue) -> StateValue {
        match self {
            SyncPayload::Init(state) => state.clone(),
            SyncPayload::Patch(patch) => apply_patch(current, patch),
        }
    }
}

/// Computes the patch that turns `old` into `new`, or `None` if they are
/// deep-equal. Shared sub-trees are skipped without being walked.
pub fn diff(old: &StateValue, new: &StateValue) -> Option<StatePatch> {
    if new.same(old) {
        return None;
    }

    match (old, new) {
        (StateValue::Table(old_table), StateValue::Table(new_table)) => {
            let mut fields = BTreeMap::new();

            for (key, new_value) in new_table.iter() {
                match old_table.get(key) {
                    Some(old_value) => {
                        if let Some(patch) = diff(old_value, new_value) {
                            fields.insert(key.clone(), patch);
                        }
                    }
                    None => {
                        fields.insert(key.clone(), StatePatch::Set(new_value.clone()));
                    }
                }
            }

            for key in old_table.keys() {
                if !new_table.contains_key(key) {
                    fields.insert(key.clone(), StatePatch::Remove);
                }
            }

            if fields.is_empty() {
                None
            } else {
                Some(StatePatch::Fields(fields))
            }
        }
        _ => {
            if old == new {
                None
            } else {
                Some(StatePatch::Set(new.clone()))
            }
        }
    }
}

/// Applies `patch` on top of `base`. Untouched sub-trees of `base` are
/// shared with the result.
pub fn apply_patch(base: &StateValue, patch: &StatePatch) -> StateValue {
    match patch {
        StatePatch::Set(value) => value.clone(),
        StatePatch::Remove => StateValue::Null,
        StatePatch::Fields(fields) => {
            let mut table: StateTable = match base {
                StateValue::Table(table) => table.as_ref().clone(),
                _ => StateTable::new(),
            };

            for (key, field_patch) in fields {
                match field_patch {
                    StatePatch::Remove => {
                        table.remove(key);
                    }
                    field_patch => {
                        let current = table.get(key).cloned().unwrap_or_default();
                        table.insert(key.clone(), apply_patch(&current, field_patch));
                    }
                }
            }

            StateValue::Table(Arc::new(table))
        }
    }
}
