use serde::{Deserialize, Serialize};

use crate::{CapturedArgs, ClassId, InstanceId};

/// Everything a mirror needs to rebuild a live authoritative instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub id: InstanceId,
    /// Exact class the authoritative side instantiated
    pub identifier: ClassId,
    /// Root of that class's inheritance chain
    pub shared_identifier: ClassId,
    pub pointer: Option<String>,
    pub arguments: CapturedArgs,
}
