/// Per-user replication scope and payload redaction
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use replikit_server::ServerConfig;
use replikit_shared::{ServerMessage, StateValue, UserKey};
use replikit_test::{
    connect_client, exchange_packets, start_server, start_server_with_config,
    test_protocol::{
        client_protocol, scoped_server_protocol, secret_server_protocol, server_protocol,
        SECRET_STORAGE, SERVER_STORAGE,
    },
    LocalTransportHub,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn with_value(state: &StateValue, value: i32) -> StateValue {
    state.with("Value", StateValue::from(value))
}

#[test]
fn test_invisible_user_receives_nothing() {
    init_logging();
    let hub = LocalTransportHub::new();
    let allowed_key = UserKey::new(1);
    let hidden_key = UserKey::new(2);
    let allowed = Arc::new(Mutex::new(BTreeSet::from([allowed_key])));
    let mut server = start_server(&hub, scoped_server_protocol(allowed));

    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();

    let mut allowed_client = connect_client(&hub, &mut server, allowed_key, client_protocol());
    let mut hidden_client = connect_client(&hub, &mut server, hidden_key, client_protocol());
    exchange_packets(&mut server, &mut [&mut allowed_client, &mut hidden_client]);

    assert!(allowed_client.mirror_exists(&id));
    assert!(!hidden_client.mirror_exists(&id));
    assert!(hidden_client.is_synced());

    server.update(&id, |state| with_value(state, 1)).unwrap();
    assert_eq!(server.user(&hidden_key).unwrap().pending_message_count(), 0);
    assert_eq!(server.user(&allowed_key).unwrap().pending_message_count(), 1);
    assert!(server.instance_descriptors_for(&hidden_key).is_empty());
    assert_eq!(server.instance_descriptors_for(&allowed_key).len(), 1);
}

#[test]
fn test_invisible_user_gets_no_destroy() {
    init_logging();
    let hub = LocalTransportHub::new();
    let allowed_key = UserKey::new(1);
    let hidden_key = UserKey::new(2);
    let allowed = Arc::new(Mutex::new(BTreeSet::from([allowed_key])));
    let mut server = start_server(&hub, scoped_server_protocol(allowed));

    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();

    let mut allowed_client = connect_client(&hub, &mut server, allowed_key, client_protocol());
    let mut hidden_client = connect_client(&hub, &mut server, hidden_key, client_protocol());
    exchange_packets(&mut server, &mut [&mut allowed_client, &mut hidden_client]);
    assert!(allowed_client.mirror_exists(&id));

    assert!(server.destroy(&id).unwrap());

    assert_eq!(
        server.take_outgoing_messages(&allowed_key),
        vec![ServerMessage::DestroyInstance { id }]
    );
    assert!(server.take_outgoing_messages(&hidden_key).is_empty());
}

#[test]
fn test_scope_changes_follow_dispatches() {
    init_logging();
    let hub = LocalTransportHub::new();
    let first_key = UserKey::new(1);
    let second_key = UserKey::new(2);
    let allowed = Arc::new(Mutex::new(BTreeSet::from([first_key])));
    let mut server = start_server(&hub, scoped_server_protocol(allowed.clone()));

    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();

    let mut first = connect_client(&hub, &mut server, first_key, client_protocol());
    let mut second = connect_client(&hub, &mut server, second_key, client_protocol());
    exchange_packets(&mut server, &mut [&mut first, &mut second]);

    // second user comes into scope
    allowed.lock().unwrap().insert(second_key);
    server.update(&id, |state| with_value(state, 1)).unwrap();
    exchange_packets(&mut server, &mut [&mut first, &mut second]);

    assert!(second.mirror_exists(&id));
    assert_eq!(second.state(&id), server.state(&id));
    assert_eq!(first.state(&id), server.state(&id));

    // first user leaves scope
    allowed.lock().unwrap().remove(&first_key);
    server.update(&id, |state| with_value(state, 2)).unwrap();
    exchange_packets(&mut server, &mut [&mut first, &mut second]);

    assert!(!first.mirror_exists(&id));
    assert!(!server.directory().is_visible(&id, &first_key));
    assert_eq!(second.state(&id), server.state(&id));
}

#[test]
fn test_secret_is_redacted_for_other_users() {
    init_logging();
    let hub = LocalTransportHub::new();
    let owner_key = UserKey::new(1);
    let other_key = UserKey::new(2);
    let mut server = start_server(&hub, secret_server_protocol());

    let id = server
        .spawn(SECRET_STORAGE, vec![StateValue::from(1)])
        .unwrap();
    server.start(&id).unwrap();

    let mut owner = connect_client(&hub, &mut server, owner_key, client_protocol());
    let mut other = connect_client(&hub, &mut server, other_key, client_protocol());
    exchange_packets(&mut server, &mut [&mut owner, &mut other]);

    assert_eq!(
        owner.state(&id).and_then(|state| state.get("Secret")),
        Some(&StateValue::from("hidden"))
    );
    assert_eq!(other.state(&id).and_then(|state| state.get("Secret")), None);

    // a change to the secret alone never reaches the other user
    server
        .update(&id, |state| state.with("Secret", StateValue::from("moved")))
        .unwrap();
    assert_eq!(server.user(&other_key).unwrap().pending_message_count(), 0);
    exchange_packets(&mut server, &mut [&mut owner, &mut other]);
    assert_eq!(
        owner.state(&id).and_then(|state| state.get("Secret")),
        Some(&StateValue::from("moved"))
    );

    // mixed changes reach the other user without the secret
    server
        .update(&id, |state| {
            with_value(state, 5).with("Secret", StateValue::from("again"))
        })
        .unwrap();
    exchange_packets(&mut server, &mut [&mut owner, &mut other]);

    assert_eq!(owner.state(&id), server.state(&id));
    assert_eq!(
        other.state(&id).and_then(|state| state.get("Value")),
        Some(&StateValue::from(5))
    );
    assert_eq!(other.state(&id).and_then(|state| state.get("Secret")), None);
}

#[test]
fn test_announcements_can_be_disabled() {
    init_logging();
    let hub = LocalTransportHub::new();
    let server_config = ServerConfig {
        announce_new_instances: false,
    };
    let mut server = start_server_with_config(&hub, server_protocol(), server_config);
    let mut client = connect_client(&hub, &mut server, UserKey::new(1), client_protocol());
    exchange_packets(&mut server, &mut [&mut client]);

    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();
    exchange_packets(&mut server, &mut [&mut client]);
    assert!(!client.mirror_exists(&id));

    client.request_all_instances(std::time::Instant::now());
    exchange_packets(&mut server, &mut [&mut client]);
    assert!(client.mirror_exists(&id));
    assert!(client.mirror(&id).unwrap().is_hydrated());
}

#[test]
fn test_disconnected_user_is_forgotten() {
    init_logging();
    let hub = LocalTransportHub::new();
    let user_key = UserKey::new(1);
    let mut server = start_server(&hub, server_protocol());
    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();

    let mut client = connect_client(&hub, &mut server, user_key, client_protocol());
    exchange_packets(&mut server, &mut [&mut client]);
    assert!(server.directory().is_hydrated(&id, &user_key));

    hub.disconnect(&user_key);
    assert!(server.disconnect_user(&user_key));

    assert!(!server.directory().is_visible(&id, &user_key));
    assert!(!server.directory().is_hydrated(&id, &user_key));
    server.update(&id, |state| with_value(state, 1)).unwrap();
    assert!(server.send_all_packets().is_ok());
}
