/// Client-side handling of server messages arriving in awkward orders
use replikit_client::{Client, ClientConfig, ClientEvent};
use replikit_server::{Server, ServerConfig};
use replikit_shared::{
    diff, ClientMessage, HostType, InstanceDescriptor, InstanceId, ServerMessage, StateValue,
    SyncPayload,
};
use replikit_test::test_protocol::{
    client_protocol, initial_storage_state, server_protocol, SERVER_STORAGE,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A started server instance, described the way the server announces it
fn started_instance() -> InstanceDescriptor {
    let mut server = Server::new(ServerConfig::default(), server_protocol());
    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();
    server.entity(&id).unwrap().descriptor()
}

fn value_patch(from: i32, to: i32) -> SyncPayload {
    let old = initial_storage_state().with("Value", StateValue::from(from));
    let new = initial_storage_state().with("Value", StateValue::from(to));
    SyncPayload::Patch(diff(&old, &new).unwrap())
}

fn hydration(value: i32) -> SyncPayload {
    SyncPayload::Init(initial_storage_state().with("Value", StateValue::from(value)))
}

fn value_of(client: &Client, id: &InstanceId) -> Option<StateValue> {
    client
        .state(id)
        .and_then(|state| state.get("Value"))
        .cloned()
}

#[test]
fn test_mirror_asks_for_hydration_when_created() {
    init_logging();
    let descriptor = started_instance();
    let mut client = Client::new(ClientConfig::default(), client_protocol());

    client.receive_message(ServerMessage::CreatedNewInstance(descriptor.clone()));

    assert!(client.mirror_exists(&descriptor.id));
    assert!(!client.mirror(&descriptor.id).unwrap().is_hydrated());
    assert_eq!(
        client.take_outgoing_messages(),
        vec![ClientMessage::Start { id: descriptor.id }]
    );
}

#[test]
fn test_patch_before_hydration_is_ignored() {
    init_logging();
    let descriptor = started_instance();
    let id = descriptor.id;
    let mut client = Client::new(ClientConfig::default(), client_protocol());
    client.receive_message(ServerMessage::CreatedNewInstance(descriptor));

    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: value_patch(0, 4),
    });
    assert_eq!(value_of(&client, &id), Some(StateValue::from(0)));

    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: hydration(4),
    });
    assert!(client.mirror(&id).unwrap().is_hydrated());
    assert_eq!(value_of(&client, &id), Some(StateValue::from(4)));

    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: value_patch(4, 6),
    });
    assert_eq!(value_of(&client, &id), Some(StateValue::from(6)));
}

#[test]
fn test_hydration_event_fires_once() {
    init_logging();
    let descriptor = started_instance();
    let id = descriptor.id;
    let mut client = Client::new(ClientConfig::default(), client_protocol());
    client.receive_message(ServerMessage::CreatedNewInstance(descriptor));
    client.take_events();

    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: hydration(1),
    });
    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: hydration(2),
    });

    assert_eq!(client.take_events(), vec![ClientEvent::InstanceHydrated { id }]);
    assert_eq!(value_of(&client, &id), Some(StateValue::from(2)));
}

#[test]
fn test_messages_for_unknown_instances_are_ignored() {
    init_logging();
    let mut client = Client::new(ClientConfig::default(), client_protocol());
    let unknown = InstanceId::new(HostType::Server, 9);

    client.receive_message(ServerMessage::Dispatch {
        id: unknown,
        payload: hydration(1),
    });
    client.receive_message(ServerMessage::DestroyInstance { id: unknown });

    assert_eq!(client.mirrors_count(), 0);
    assert!(client.take_events().is_empty());
    assert!(client.take_outgoing_messages().is_empty());
}

#[test]
fn test_blocked_mirror_ignores_server_payloads() {
    init_logging();
    let descriptor = started_instance();
    let id = descriptor.id;
    let mut client = Client::new(ClientConfig::default(), client_protocol());
    client.receive_message(ServerMessage::CreatedNewInstance(descriptor));

    client.set_block_server_dispatches(&id, true).unwrap();
    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: hydration(3),
    });
    assert!(!client.mirror(&id).unwrap().is_hydrated());
    assert_eq!(value_of(&client, &id), Some(StateValue::from(0)));

    client.set_block_server_dispatches(&id, false).unwrap();
    client.receive_message(ServerMessage::Dispatch {
        id,
        payload: hydration(3),
    });
    assert_eq!(value_of(&client, &id), Some(StateValue::from(3)));
}

#[test]
fn test_duplicate_announcement_keeps_mirror() {
    init_logging();
    let descriptor = started_instance();
    let id = descriptor.id;
    let mut client = Client::new(ClientConfig::default(), client_protocol());

    client.receive_message(ServerMessage::CreatedNewInstance(descriptor.clone()));
    let provisional_id = client.mirror(&id).unwrap().provisional_id();
    client.receive_message(ServerMessage::CreatedNewInstance(descriptor));

    assert_eq!(client.mirrors_count(), 1);
    assert_eq!(client.mirror(&id).unwrap().provisional_id(), provisional_id);
    assert_eq!(client.resolve_id(&provisional_id), Some(id));
}
