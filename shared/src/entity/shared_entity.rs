use std::mem;

use log::info;

use crate::{
    reconcile, CapturedArgs, ClassId, ConstructedClass, EntityError, HostType,
    InstanceDescriptor, InstanceId, Observers, Pointer, SharedBehavior, StateValue, Subscription,
    SyncPayload, UserKey,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityLifecycle {
    Constructed,
    Started,
    Destroyed,
}

/// One side's copy of a shared instance.
///
/// The authoritative copy lives on the server; each client holds a separate
/// mirror with the same id. The two never share memory, only serialized
/// state.
pub struct SharedEntity {
    id: InstanceId,
    class: ClassId,
    root: ClassId,
    host_type: HostType,
    state: StateValue,
    previous_state: StateValue,
    pointer: Option<Pointer>,
    lifecycle: EntityLifecycle,
    behavior: Box<dyn SharedBehavior>,
    arguments: CapturedArgs,
    observers: Observers,
}

impl SharedEntity {
    pub fn new(host_type: HostType, id: InstanceId, constructed: ConstructedClass) -> Self {
        let ConstructedClass {
            class,
            root,
            behavior,
            arguments,
            subscriptions,
        } = constructed;

        let state = behavior.initial_state();
        let observers = Observers::new(host_type);
        for subscription in &subscriptions {
            observers.attach_class(subscription);
        }

        Self {
            id,
            class,
            root,
            host_type,
            previous_state: state.clone(),
            state,
            pointer: None,
            lifecycle: EntityLifecycle::Constructed,
            behavior,
            arguments,
            observers,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn class(&self) -> &ClassId {
        &self.class
    }

    pub fn root(&self) -> &ClassId {
        &self.root
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn state(&self) -> &StateValue {
        &self.state
    }

    pub fn previous_state(&self) -> &StateValue {
        &self.previous_state
    }

    pub fn pointer(&self) -> Option<&Pointer> {
        self.pointer.as_ref()
    }

    pub fn arguments(&self) -> &CapturedArgs {
        &self.arguments
    }

    pub fn lifecycle(&self) -> EntityLifecycle {
        self.lifecycle
    }

    pub fn is_started(&self) -> bool {
        self.lifecycle == EntityLifecycle::Started
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == EntityLifecycle::Destroyed
    }

    pub fn behavior(&self) -> &dyn SharedBehavior {
        self.behavior.as_ref()
    }

    fn check_alive(&self, operation: &'static str) -> Result<(), EntityError> {
        if self.is_destroyed() {
            return Err(EntityError::Destroyed {
                id: self.id.to_string(),
                operation,
            });
        }
        Ok(())
    }

    /// Returns `Ok(false)` if the instance was already started
    pub fn start(&mut self) -> Result<bool, EntityError> {
        self.check_alive("start")?;
        if self.is_started() {
            return Ok(false);
        }

        self.lifecycle = EntityLifecycle::Started;
        info!("Shared instance {} ({}) started", self.id, self.class);
        self.behavior.on_start(&self.id);
        Ok(true)
    }

    /// Replaces the current state, keeping every unchanged sub-tree of the
    /// old state. Returns `Ok(false)` when nothing changed; observers only run
    /// on a change.
    pub fn set_state(&mut self, new_state: StateValue) -> Result<bool, EntityError> {
        self.check_alive("dispatch to")?;

        let reconciled = reconcile(new_state, &self.state);
        if reconciled.same(&self.state) {
            return Ok(false);
        }

        self.previous_state = mem::replace(&mut self.state, reconciled);
        self.observers
            .notify(&self.id, &self.state, &self.previous_state);
        Ok(true)
    }

    /// Computes the next state from the current one, then dispatches it
    pub fn update<F>(&mut self, action: F) -> Result<bool, EntityError>
    where
        F: FnOnce(&StateValue) -> StateValue,
    {
        self.check_alive("update")?;
        let next = action(&self.state);
        self.set_state(next)
    }

    pub fn subscribe<S, L>(&self, selector: S, listener: L) -> Result<Subscription, EntityError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        self.check_alive("subscribe to")?;
        Ok(self.observers.subscribe(selector, listener))
    }

    pub fn subscribe_if<S, P, L>(
        &self,
        selector: S,
        predicate: P,
        listener: L,
    ) -> Result<Subscription, EntityError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        P: Fn(&StateValue, &StateValue) -> bool + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        self.check_alive("subscribe to")?;
        Ok(self.observers.subscribe_if(selector, predicate, listener))
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn set_pointer(&mut self, pointer: Option<Pointer>) -> Result<(), EntityError> {
        self.check_alive("attach a pointer to")?;
        self.pointer = pointer;
        Ok(())
    }

    /// Swaps a provisional client id for the id the server assigned.
    /// Returns the provisional id.
    pub fn confirm_id(&mut self, confirmed: InstanceId) -> Result<InstanceId, EntityError> {
        self.check_alive("confirm")?;
        if !self.id.is_provisional() {
            return Err(EntityError::AlreadyConfirmed {
                id: self.id.to_string(),
            });
        }
        if confirmed.is_provisional() {
            return Err(EntityError::InvalidConfirmation {
                provisional: self.id.to_string(),
                confirmed: confirmed.to_string(),
            });
        }
        Ok(mem::replace(&mut self.id, confirmed))
    }

    pub fn describe(&self) -> InstanceDescriptor {
        InstanceDescriptor {
            id: self.id,
            identifier: self.class.clone(),
            shared_identifier: self.root.clone(),
            pointer: self.pointer.as_ref().map(|pointer| pointer.name().to_string()),
            arguments: self.arguments.clone(),
        }
    }

    pub fn resolve_replication_for_player(&self, user: &UserKey) -> bool {
        self.behavior.resolve_replication_for_player(user)
    }

    pub fn resolve_is_sync_for_player(&self, user: &UserKey, payload: &SyncPayload) -> bool {
        self.behavior.resolve_is_sync_for_player(user, payload)
    }

    pub fn resolve_sync_for_player(&self, user: &UserKey, payload: SyncPayload) -> SyncPayload {
        self.behavior.resolve_sync_for_player(user, payload)
    }

    /// Tears the instance down and disconnects every listener. Returns
    /// `false` if it was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.is_destroyed() {
            return false;
        }

        self.lifecycle = EntityLifecycle::Destroyed;
        self.behavior.on_destroy(&self.id);
        self.observers.clear();
        info!("Shared instance {} ({}) destroyed", self.id, self.class);
        true
    }
}
