use std::collections::HashMap;

use log::info;

use crate::{
    CapturedArgs, ClassDescriptor, ClassId, ClassSubscription, Construction, ProtocolError,
    SharedBehavior, StateValue,
};

struct ClassRecord {
    descriptor: ClassDescriptor,
    // class first, root last
    chain: Vec<ClassId>,
}

/// Everything the registry produces when it runs a class factory
pub struct ConstructedClass {
    pub class: ClassId,
    pub root: ClassId,
    pub behavior: Box<dyn SharedBehavior>,
    pub arguments: CapturedArgs,
    pub subscriptions: Vec<ClassSubscription>,
}

/// Static inheritance table of every declared shared class
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<ClassId, ClassRecord>,
    order: Vec<ClassId>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `descriptor` and derives its inheritance chain. Parents must be
    /// registered before their subclasses.
    pub fn register(&mut self, descriptor: ClassDescriptor) -> Result<(), ProtocolError> {
        let identifier = descriptor.identifier().clone();

        if self.classes.contains_key(&identifier) {
            return Err(ProtocolError::DuplicateClass {
                identifier: identifier.to_string(),
            });
        }

        let mut chain = vec![identifier.clone()];
        if let Some(parent) = descriptor.parent() {
            let Some(parent_record) = self.classes.get(parent) else {
                return Err(ProtocolError::UnknownParent {
                    identifier: identifier.to_string(),
                    parent: parent.to_string(),
                });
            };
            chain.extend(parent_record.chain.iter().cloned());
        }

        let root = chain[chain.len() - 1].clone();
        if descriptor.is_concrete() && !descriptor.is_disambiguated() {
            if let Some(existing) = self.default_implementation(&root) {
                return Err(ProtocolError::ConflictingImplementations {
                    root: root.to_string(),
                    existing: existing.to_string(),
                    conflicting: identifier.to_string(),
                });
            }
        }

        info!(
            "ClassRegistry: registered {} (root {}, depth {})",
            identifier,
            root,
            chain.len()
        );

        self.order.push(identifier.clone());
        self.classes
            .insert(identifier, ClassRecord { descriptor, chain });

        Ok(())
    }

    pub fn contains(&self, class: &ClassId) -> bool {
        self.classes.contains_key(class)
    }

    pub fn descriptor(&self, class: &ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(class).map(|record| &record.descriptor)
    }

    pub fn is_concrete(&self, class: &ClassId) -> bool {
        self.descriptor(class)
            .is_some_and(|descriptor| descriptor.is_concrete())
    }

    /// Class first, root last
    pub fn chain(&self, class: &ClassId) -> Result<&[ClassId], ProtocolError> {
        self.classes
            .get(class)
            .map(|record| record.chain.as_slice())
            .ok_or_else(|| ProtocolError::UnknownClass {
                identifier: class.to_string(),
            })
    }

    /// The oldest ancestor of `class`
    pub fn resolve_root(&self, class: &ClassId) -> Result<&ClassId, ProtocolError> {
        let chain = self.chain(class)?;
        Ok(&chain[chain.len() - 1])
    }

    /// Every concrete class registered under `root`, in registration order
    pub fn implementations(&self, root: &ClassId) -> Vec<&ClassId> {
        self.order
            .iter()
            .filter(|class| {
                self.classes.get(*class).is_some_and(|record| {
                    record.descriptor.is_concrete() && record.chain.last() == Some(root)
                })
            })
            .collect()
    }

    fn default_implementation(&self, root: &ClassId) -> Option<&ClassId> {
        self.order.iter().find(|class| {
            self.classes.get(*class).is_some_and(|record| {
                record.descriptor.is_concrete()
                    && !record.descriptor.is_disambiguated()
                    && record.chain.last() == Some(root)
            })
        })
    }

    /// The single default-resolvable concrete class under `root`
    pub fn resolve_implementation(&self, root: &ClassId) -> Result<&ClassId, ProtocolError> {
        if !self.contains(root) {
            return Err(ProtocolError::UnknownClass {
                identifier: root.to_string(),
            });
        }

        if let Some(class) = self.default_implementation(root) {
            return Ok(class);
        }

        let candidates = self.implementations(root);
        if candidates.is_empty() {
            Err(ProtocolError::NoImplementation {
                root: root.to_string(),
            })
        } else {
            Err(ProtocolError::AmbiguousImplementation {
                root: root.to_string(),
                candidates: candidates
                    .iter()
                    .map(|class| class.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
    }

    /// Runs the factory of `class`, capturing `args` for every level of its
    /// inheritance chain
    pub fn construct(
        &self,
        class: &ClassId,
        args: Vec<StateValue>,
    ) -> Result<ConstructedClass, ProtocolError> {
        let record = self
            .classes
            .get(class)
            .ok_or_else(|| ProtocolError::UnknownClass {
                identifier: class.to_string(),
            })?;
        let factory = record
            .descriptor
            .factory()
            .ok_or_else(|| ProtocolError::AbstractClass {
                identifier: class.to_string(),
            })?;

        let mut construction = Construction::new(&record.chain, args);
        let behavior = factory(&mut construction);
        let arguments = construction.into_captured();

        let mut subscriptions = Vec::new();
        for ancestor in record.chain.iter().rev() {
            if let Some(ancestor_record) = self.classes.get(ancestor) {
                subscriptions.extend(ancestor_record.descriptor.subscriptions().iter().cloned());
            }
        }

        Ok(ConstructedClass {
            class: class.clone(),
            root: record.chain[record.chain.len() - 1].clone(),
            behavior,
            arguments,
            subscriptions,
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
