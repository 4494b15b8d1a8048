use log::trace;

use replikit_shared::{
    ClassId, ClassRegistry, InstanceDescriptor, Pointer, PointerRegistry, StateValue,
};

use crate::ClientError;

/// What the client builds for a server instance
pub(crate) struct Resolution {
    pub class: ClassId,
    pub args: Vec<StateValue>,
    pub pointer: Option<Pointer>,
}

/// Picks the local class and constructor arguments for a server instance.
///
/// A pointer known to this client wins. Then the exact class the server
/// built, if it is concrete here. Then the single default implementation of
/// the shared root.
pub(crate) fn resolve(
    classes: &ClassRegistry,
    pointers: &PointerRegistry,
    descriptor: &InstanceDescriptor,
) -> Result<Resolution, ClientError> {
    let pointer = descriptor
        .pointer
        .as_deref()
        .and_then(|name| pointers.get(name));

    if let Some(pointer) = pointer {
        let class = pointers.resolve(&pointer)?.clone();
        let chain = classes.chain(&class)?;
        let args = descriptor
            .arguments
            .find_in_chain(chain)
            .cloned()
            .unwrap_or_default();
        return Ok(Resolution {
            class,
            args,
            pointer: Some(pointer),
        });
    }

    if let Some(name) = &descriptor.pointer {
        trace!(
            "Pointer {} of {} is unknown here, resolving by class",
            name,
            descriptor.id
        );
    }

    if classes.is_concrete(&descriptor.identifier) {
        let args = descriptor
            .arguments
            .get(&descriptor.identifier)
            .cloned()
            .unwrap_or_default();
        return Ok(Resolution {
            class: descriptor.identifier.clone(),
            args,
            pointer: None,
        });
    }

    let class = classes
        .resolve_implementation(&descriptor.shared_identifier)?
        .clone();
    let chain = classes.chain(&class)?;
    let args = descriptor
        .arguments
        .find_in_chain(chain)
        .cloned()
        .unwrap_or_default();

    Ok(Resolution {
        class,
        args,
        pointer: None,
    })
}
