use replikit_shared::{
    CapturedArgs, ClassId, InstanceId, Pointer, SharedEntity, StateValue,
};

/// A client-side reflection of a server instance
pub struct Mirror {
    entity: SharedEntity,
    provisional_id: InstanceId,
    confirmed_state: StateValue,
    hydrated: bool,
    block_server_dispatches: bool,
}

impl Mirror {
    pub(crate) fn new(entity: SharedEntity, provisional_id: InstanceId) -> Self {
        Self {
            confirmed_state: entity.state().clone(),
            entity,
            provisional_id,
            hydrated: false,
            block_server_dispatches: false,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.entity.id()
    }

    /// The id the mirror carried before the server id replaced it
    pub fn provisional_id(&self) -> InstanceId {
        self.provisional_id
    }

    pub fn class(&self) -> &ClassId {
        self.entity.class()
    }

    pub fn state(&self) -> &StateValue {
        self.entity.state()
    }

    pub fn previous_state(&self) -> &StateValue {
        self.entity.previous_state()
    }

    pub fn pointer(&self) -> Option<&Pointer> {
        self.entity.pointer()
    }

    pub fn arguments(&self) -> &CapturedArgs {
        self.entity.arguments()
    }

    /// Whether the full state has arrived. Patches are ignored until it has.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn blocks_server_dispatches(&self) -> bool {
        self.block_server_dispatches
    }

    pub(crate) fn entity(&self) -> &SharedEntity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut SharedEntity {
        &mut self.entity
    }

    /// The last state the server sent. Patches apply to this, not to local edits.
    pub(crate) fn confirmed_state(&self) -> &StateValue {
        &self.confirmed_state
    }

    pub(crate) fn set_confirmed_state(&mut self, state: StateValue) {
        self.confirmed_state = state;
    }

    pub(crate) fn set_hydrated(&mut self) {
        self.hydrated = true;
    }

    pub(crate) fn set_block_server_dispatches(&mut self, block: bool) {
        self.block_server_dispatches = block;
    }
}
