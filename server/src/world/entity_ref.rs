use replikit_shared::{
    CapturedArgs, ClassId, InstanceDescriptor, InstanceId, Pointer, SharedEntity, StateValue,
};

// EntityRef
pub struct EntityRef<'s> {
    entity: &'s SharedEntity,
}

impl<'s> EntityRef<'s> {
    pub(crate) fn new(entity: &'s SharedEntity) -> Self {
        Self { entity }
    }

    pub fn id(&self) -> InstanceId {
        self.entity.id()
    }

    pub fn class(&self) -> &ClassId {
        self.entity.class()
    }

    pub fn root(&self) -> &ClassId {
        self.entity.root()
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

    pub fn is_started(&self) -> bool {
        self.entity.is_started()
    }

    pub fn descriptor(&self) -> InstanceDescriptor {
        self.entity.describe()
    }
}
