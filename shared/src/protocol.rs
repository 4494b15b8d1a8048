use crate::{ClassDescriptor, ClassRegistry};

pub mod error;
pub use error::ProtocolError;

// Protocol
#[derive(Default)]
pub struct Protocol {
    classes: ClassRegistry,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Registers a shared class.
    ///
    /// # Panics
    /// Panics on any configuration error (duplicate identifier, unknown parent,
    /// second default implementation under one root), or if the protocol is
    /// locked.
    pub fn add_class(&mut self, descriptor: ClassDescriptor) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.classes.register(descriptor) {
            panic!("Invalid shared class configuration: {}", error);
        }
        self
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    // Non-panicking builder methods

    pub fn try_add_class(&mut self, descriptor: ClassDescriptor) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.classes.register(descriptor)?;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Panics if protocol is locked
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
