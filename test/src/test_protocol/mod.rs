/// Shared classes used across the E2E tests
///
/// Every test protocol declares the `ValueStorage` root. The server side
/// implements it with `ServerStorage`, the client side with `ClientStorage`,
/// so mirrors are always resolved through the root.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use replikit_shared::{
    ClassDescriptor, Construction, InstanceId, Protocol, SharedBehavior, StatePatch, StateValue,
    SyncPayload, UserKey,
};

pub const VALUE_STORAGE: &str = "ValueStorage";
pub const SERVER_STORAGE: &str = "ServerStorage";
pub const CLIENT_STORAGE: &str = "ClientStorage";
pub const FOO: &str = "Foo";
pub const SECRET_STORAGE: &str = "SecretStorage";

/// `{ Value: 0, Config: { Name: "Da" } }`
pub fn initial_storage_state() -> StateValue {
    StateValue::table([
        ("Value", StateValue::from(0)),
        (
            "Config",
            StateValue::table([("Name", StateValue::from("Da"))]),
        ),
    ])
}

pub fn value_of(state: &StateValue) -> StateValue {
    state.get("Value").cloned().unwrap_or_default()
}

/// Plain storage: everyone sees everything
pub struct Storage {
    lifecycle: Option<Arc<Mutex<Vec<String>>>>,
}

impl Storage {
    pub fn new() -> Self {
        Self { lifecycle: None }
    }

    pub fn recording(lifecycle: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            lifecycle: Some(lifecycle),
        }
    }
}

impl SharedBehavior for Storage {
    fn initial_state(&self) -> StateValue {
        initial_storage_state()
    }

    fn on_start(&mut self, id: &InstanceId) {
        if let Some(lifecycle) = &self.lifecycle {
            lifecycle.lock().unwrap().push(format!("start {}", id));
        }
    }

    fn on_destroy(&mut self, id: &InstanceId) {
        if let Some(lifecycle) = &self.lifecycle {
            lifecycle.lock().unwrap().push(format!("destroy {}", id));
        }
    }
}

/// Storage that only the users on an allow list may see. The list can change
/// while the instance lives.
pub struct ScopedStorage {
    allowed: Arc<Mutex<BTreeSet<UserKey>>>,
}

impl SharedBehavior for ScopedStorage {
    fn initial_state(&self) -> StateValue {
        initial_storage_state()
    }

    fn resolve_replication_for_player(&self, user: &UserKey) -> bool {
        self.allowed.lock().unwrap().contains(user)
    }
}

/// Storage whose `Secret` key is stripped for every user but `owner`, and
/// whose patches touching only `Secret` are not sent to anyone else
pub struct SecretStorage {
    owner: UserKey,
}

impl SecretStorage {
    fn touches_only_secret(payload: &SyncPayload) -> bool {
        match payload {
            SyncPayload::Patch(StatePatch::Fields(fields)) => {
                fields.keys().all(|key| key == "Secret")
            }
            _ => false,
        }
    }
}

impl SharedBehavior for SecretStorage {
    fn initial_state(&self) -> StateValue {
        initial_storage_state().with("Secret", StateValue::from("hidden"))
    }

    fn resolve_is_sync_for_player(&self, user: &UserKey, payload: &SyncPayload) -> bool {
        *user == self.owner || !Self::touches_only_secret(payload)
    }

    fn resolve_sync_for_player(&self, user: &UserKey, payload: SyncPayload) -> SyncPayload {
        if *user == self.owner {
            return payload;
        }
        match payload {
            SyncPayload::Init(state) => SyncPayload::Init(state.without("Secret")),
            SyncPayload::Patch(StatePatch::Fields(mut fields)) => {
                fields.remove("Secret");
                SyncPayload::Patch(StatePatch::Fields(fields))
            }
            other => other,
        }
    }
}

/// Holds whatever its constructor was given
pub struct ArgumentStorage {
    args: Vec<StateValue>,
}

impl ArgumentStorage {
    fn from_construction(construction: &mut Construction<'_>) -> Self {
        Self {
            args: construction.args().to_vec(),
        }
    }
}

impl SharedBehavior for ArgumentStorage {
    fn initial_state(&self) -> StateValue {
        StateValue::table([("Args", StateValue::list(self.args.iter().cloned()))])
    }
}

fn storage_root(protocol: &mut Protocol) {
    protocol.add_class(ClassDescriptor::new(VALUE_STORAGE));
}

fn foo_class() -> ClassDescriptor {
    ClassDescriptor::new(FOO)
        .extends(VALUE_STORAGE)
        .with_factory(|construction| Box::new(ArgumentStorage::from_construction(construction)))
        .disambiguated()
}

/// Server protocol with `ServerStorage` and the pointer-only `Foo`
pub fn server_protocol() -> Protocol {
    let mut protocol = Protocol::builder();
    storage_root(&mut protocol);
    protocol
        .add_class(
            ClassDescriptor::new(SERVER_STORAGE)
                .extends(VALUE_STORAGE)
                .with_factory(|_| Box::new(Storage::new())),
        )
        .add_class(foo_class());
    protocol.build()
}

/// Client protocol with `ClientStorage` and the pointer-only `Foo`
pub fn client_protocol() -> Protocol {
    let mut protocol = Protocol::builder();
    storage_root(&mut protocol);
    protocol
        .add_class(
            ClassDescriptor::new(CLIENT_STORAGE)
                .extends(VALUE_STORAGE)
                .with_factory(|_| Box::new(Storage::new())),
        )
        .add_class(foo_class());
    protocol.build()
}

/// Client protocol whose `ClientStorage` records its lifecycle hooks
pub fn recording_client_protocol(lifecycle: Arc<Mutex<Vec<String>>>) -> Protocol {
    let mut protocol = Protocol::builder();
    storage_root(&mut protocol);
    protocol.add_class(
        ClassDescriptor::new(CLIENT_STORAGE)
            .extends(VALUE_STORAGE)
            .with_factory(move |_| Box::new(Storage::recording(lifecycle.clone()))),
    );
    protocol.build()
}

/// Server protocol where `ServerStorage` is only visible to `allowed` users
pub fn scoped_server_protocol(allowed: Arc<Mutex<BTreeSet<UserKey>>>) -> Protocol {
    let mut protocol = Protocol::builder();
    storage_root(&mut protocol);
    protocol.add_class(
        ClassDescriptor::new(SERVER_STORAGE)
            .extends(VALUE_STORAGE)
            .with_factory(move |_| {
                Box::new(ScopedStorage {
                    allowed: allowed.clone(),
                })
            }),
    );
    protocol.build()
}

/// Server protocol with `SecretStorage` owned by the user its first argument
/// names
pub fn secret_server_protocol() -> Protocol {
    let mut protocol = Protocol::builder();
    storage_root(&mut protocol);
    protocol.add_class(
        ClassDescriptor::new(SECRET_STORAGE)
            .extends(VALUE_STORAGE)
            .with_factory(|construction| {
                let owner = construction
                    .arg(0)
                    .and_then(StateValue::as_i64)
                    .unwrap_or_default();
                Box::new(SecretStorage {
                    owner: UserKey::new(owner as u64),
                })
            }),
    );
    protocol.build()
}
