use replikit_shared::{InstanceId, Pointer, StateValue, Subscription};

use crate::{Server, ServerError};

// EntityMut
pub struct EntityMut<'s> {
    server: &'s mut Server,
    id: InstanceId,
}

impl<'s> EntityMut<'s> {
    pub(crate) fn new(server: &'s mut Server, id: &InstanceId) -> Self {
        Self { server, id: *id }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn state(&self) -> Option<&StateValue> {
        self.server.state(&self.id)
    }

    pub fn start(&mut self) -> Result<&mut Self, ServerError> {
        self.server.start(&self.id)?;
        Ok(self)
    }

    pub fn dispatch(&mut self, state: StateValue) -> Result<&mut Self, ServerError> {
        self.server.dispatch(&self.id, state)?;
        Ok(self)
    }

    pub fn update<F>(&mut self, action: F) -> Result<&mut Self, ServerError>
    where
        F: FnOnce(&StateValue) -> StateValue,
    {
        self.server.update(&self.id, action)?;
        Ok(self)
    }

    pub fn attach_pointer(&mut self, pointer: &Pointer) -> Result<&mut Self, ServerError> {
        self.server.attach_pointer(&self.id, pointer)?;
        Ok(self)
    }

    pub fn subscribe<S, L>(&mut self, selector: S, listener: L) -> Result<Subscription, ServerError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        self.server.subscribe(&self.id, selector, listener)
    }

    pub fn destroy(self) -> Result<bool, ServerError> {
        self.server.destroy(&self.id)
    }
}
