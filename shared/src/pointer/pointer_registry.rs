use std::{collections::HashMap, fmt};

use log::info;

use crate::{ClassId, PointerError};

/// Handle to a named slot in a [`PointerRegistry`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer(String);

impl Pointer {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named slots, each bound to at most one class.
///
/// A server creates a pointer for a logical object before any shared
/// instance exists for it; a client that creates the same pointer and binds it
/// can resolve which class to build when an instance tagged with that pointer
/// arrives.
#[derive(Default)]
pub struct PointerRegistry {
    bindings: HashMap<String, Option<ClassId>>,
}

impl PointerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: impl Into<String>) -> Result<Pointer, PointerError> {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return Err(PointerError::AlreadyExists { name });
        }
        self.bindings.insert(name.clone(), None);
        Ok(Pointer(name))
    }

    pub fn get(&self, name: &str) -> Option<Pointer> {
        self.bindings
            .contains_key(name)
            .then(|| Pointer(name.to_string()))
    }

    /// Binding the class a pointer is already bound to is a no-op
    pub fn bind(&mut self, pointer: &Pointer, class: &ClassId) -> Result<(), PointerError> {
        let Some(binding) = self.bindings.get_mut(pointer.name()) else {
            return Err(PointerError::NotFound {
                name: pointer.name().to_string(),
            });
        };

        match binding {
            Some(bound) if bound == class => Ok(()),
            Some(bound) => Err(PointerError::AlreadyBound {
                name: pointer.name().to_string(),
                bound: bound.to_string(),
                requested: class.to_string(),
            }),
            None => {
                info!("Pointer {} bound to {}", pointer, class);
                *binding = Some(class.clone());
                Ok(())
            }
        }
    }

    pub fn unbind(&mut self, pointer: &Pointer) {
        if let Some(binding) = self.bindings.get_mut(pointer.name()) {
            *binding = None;
        }
    }

    pub fn resolve(&self, pointer: &Pointer) -> Result<&ClassId, PointerError> {
        match self.bindings.get(pointer.name()) {
            None => Err(PointerError::NotFound {
                name: pointer.name().to_string(),
            }),
            Some(None) => Err(PointerError::Unbound {
                name: pointer.name().to_string(),
            }),
            Some(Some(class)) => Ok(class),
        }
    }

    pub fn is_bound(&self, pointer: &Pointer) -> bool {
        matches!(self.bindings.get(pointer.name()), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
