use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClassId, StateValue};

/// Construction arguments of one instance, keyed by the class identifier
/// each level of the inheritance chain received them under.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapturedArgs(BTreeMap<ClassId, Vec<StateValue>>);

impl CapturedArgs {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, class: ClassId, args: Vec<StateValue>) {
        self.0.insert(class, args);
    }

    pub fn get(&self, class: &ClassId) -> Option<&Vec<StateValue>> {
        self.0.get(class)
    }

    /// Returns the arguments captured under the first class of `chain` that
    /// has any
    pub fn find_in_chain(&self, chain: &[ClassId]) -> Option<&Vec<StateValue>> {
        chain.iter().find_map(|class| self.0.get(class))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassId> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
