use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{Construction, InstanceId, SharedBehavior, Side, StateValue};

/// Stable identifier of a shared class
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ClassId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&ClassId> for ClassId {
    fn from(value: &ClassId) -> Self {
        value.clone()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) type ClassFactory =
    Arc<dyn Fn(&mut Construction<'_>) -> Box<dyn SharedBehavior> + Send + Sync>;
pub(crate) type Selector = Arc<dyn Fn(&StateValue) -> StateValue + Send + Sync>;
pub(crate) type Predicate = Arc<dyn Fn(&StateValue, &StateValue) -> bool + Send + Sync>;
pub(crate) type ClassListener = Arc<dyn Fn(&InstanceId, &StateValue, &StateValue) + Send + Sync>;

/// A change listener declared once on a class and attached to every instance
/// constructed from it (or from any subclass)
#[derive(Clone)]
pub struct ClassSubscription {
    pub(crate) side: Side,
    pub(crate) selector: Selector,
    pub(crate) predicate: Option<Predicate>,
    pub(crate) listener: ClassListener,
}

impl ClassSubscription {
    pub fn side(&self) -> Side {
        self.side
    }
}

/// Declaration of a shared class: its identifier, its parent, and, for
/// concrete classes, the factory that builds instances.
///
/// ```ignore
/// protocol
///     .add_class(ClassDescriptor::new("ValueStorage"))
///     .add_class(
///         ClassDescriptor::new("ServerStorage")
///             .extends("ValueStorage")
///             .with_factory(|construction| Box::new(Counter::new(construction.args()))),
///     );
/// ```
#[derive(Clone)]
pub struct ClassDescriptor {
    identifier: ClassId,
    parent: Option<ClassId>,
    factory: Option<ClassFactory>,
    disambiguated: bool,
    subscriptions: Vec<ClassSubscription>,
}

impl ClassDescriptor {
    /// Declares an abstract class with no parent
    pub fn new(identifier: impl Into<ClassId>) -> Self {
        Self {
            identifier: identifier.into(),
            parent: None,
            factory: None,
            disambiguated: false,
            subscriptions: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<ClassId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Makes the class concrete
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&mut Construction<'_>) -> Box<dyn SharedBehavior> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Excludes this concrete class from root resolution. It can then only be
    /// reached through its exact identifier or through a pointer, and does not
    /// conflict with the root's default implementation.
    pub fn disambiguated(mut self) -> Self {
        self.disambiguated = true;
        self
    }

    pub fn subscribe<S, L>(self, side: Side, selector: S, listener: L) -> Self
    where
        S: Fn(&StateValue) -> StateValue + Send + Sync + 'static,
        L: Fn(&InstanceId, &StateValue, &StateValue) + Send + Sync + 'static,
    {
        self.push_subscription(side, Arc::new(selector), None, Arc::new(listener))
    }

    /// Like [`ClassDescriptor::subscribe`], but `listener` only runs when
    /// `predicate(new, old)` holds for the selected values
    pub fn subscribe_if<S, P, L>(self, side: Side, selector: S, predicate: P, listener: L) -> Self
    where
        S: Fn(&StateValue) -> StateValue + Send + Sync + 'static,
        P: Fn(&StateValue, &StateValue) -> bool + Send + Sync + 'static,
        L: Fn(&InstanceId, &StateValue, &StateValue) + Send + Sync + 'static,
    {
        self.push_subscription(
            side,
            Arc::new(selector),
            Some(Arc::new(predicate)),
            Arc::new(listener),
        )
    }

    fn push_subscription(
        mut self,
        side: Side,
        selector: Selector,
        predicate: Option<Predicate>,
        listener: ClassListener,
    ) -> Self {
        self.subscriptions.push(ClassSubscription {
            side,
            selector,
            predicate,
            listener,
        });
        self
    }

    pub fn identifier(&self) -> &ClassId {
        &self.identifier
    }

    pub fn parent(&self) -> Option<&ClassId> {
        self.parent.as_ref()
    }

    pub fn is_concrete(&self) -> bool {
        self.factory.is_some()
    }

    pub fn is_disambiguated(&self) -> bool {
        self.disambiguated
    }

    pub fn subscriptions(&self) -> &[ClassSubscription] {
        &self.subscriptions
    }

    pub(crate) fn factory(&self) -> Option<&ClassFactory> {
        self.factory.as_ref()
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("identifier", &self.identifier)
            .field("parent", &self.parent)
            .field("concrete", &self.is_concrete())
            .field("disambiguated", &self.disambiguated)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
