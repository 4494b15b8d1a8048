use log::warn;

use crate::{CapturedArgs, ClassId, StateValue};

/// Handed to a class factory while an instance is being built.
///
/// The arguments given to the factory are recorded under the class's own
/// identifier and, unless the factory forwards something else, passed on
/// unchanged to every ancestor. Each call to [`Construction::forward`] sets
/// what the next ancestor up the chain receives.
pub struct Construction<'a> {
    chain: &'a [ClassId],
    args: Vec<StateValue>,
    forwarded: Vec<Option<Vec<StateValue>>>,
    level: usize,
}

impl<'a> Construction<'a> {
    pub(crate) fn new(chain: &'a [ClassId], args: Vec<StateValue>) -> Self {
        Self {
            chain,
            args,
            forwarded: vec![None; chain.len()],
            level: 0,
        }
    }

    /// The class being instantiated
    pub fn class(&self) -> &ClassId {
        &self.chain[0]
    }

    /// The inheritance chain, class first and root last
    pub fn chain(&self) -> &[ClassId] {
        self.chain
    }

    pub fn args(&self) -> &[StateValue] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&StateValue> {
        self.args.get(index)
    }

    /// Records the arguments the next ancestor's constructor receives
    pub fn forward(&mut self, args: Vec<StateValue>) -> &mut Self {
        let next = self.level + 1;
        if next >= self.chain.len() {
            warn!(
                "Class {} forwarded constructor arguments past its root {}",
                self.class(),
                self.chain[self.chain.len() - 1]
            );
            return self;
        }
        self.forwarded[next] = Some(args);
        self.level = next;
        self
    }

    pub(crate) fn into_captured(self) -> CapturedArgs {
        let mut captured = CapturedArgs::new();
        let mut current = self.args;

        for (class, forwarded) in self.chain.iter().zip(self.forwarded) {
            if let Some(args) = forwarded {
                current = args;
            }
            captured.insert(class.clone(), current.clone());
        }

        captured
    }
}
