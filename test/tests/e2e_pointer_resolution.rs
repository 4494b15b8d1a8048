/// Mirrors resolving their class through pointers, exact identifiers and roots
use replikit_server::ServerError;
use replikit_shared::{ClassId, PointerError, PointerRegistry, StateValue, UserKey};
use replikit_test::{
    connect_client, exchange_packets, start_server,
    test_protocol::{client_protocol, server_protocol, CLIENT_STORAGE, FOO, SERVER_STORAGE},
    LocalTransportHub,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn foo_args() -> Vec<StateValue> {
    vec![StateValue::from(1), StateValue::from("a")]
}

#[test]
fn test_bound_pointer_selects_class_and_arguments() {
    init_logging();
    let hub = LocalTransportHub::new();
    let mut server = start_server(&hub, server_protocol());

    let pointer = server.pointers_mut().create("slot-1").unwrap();
    let id = server.spawn(FOO, foo_args()).unwrap();
    server.attach_pointer(&id, &pointer).unwrap();
    server.start(&id).unwrap();

    let mut client = connect_client(&hub, &mut server, UserKey::new(1), client_protocol());
    let client_pointer = client.pointers_mut().create("slot-1").unwrap();
    client
        .pointers_mut()
        .bind(&client_pointer, &ClassId::from(FOO))
        .unwrap();
    exchange_packets(&mut server, &mut [&mut client]);

    let mirror = client.mirror(&id).expect("mirror should be resolved through the pointer");
    assert_eq!(mirror.class(), &ClassId::from(FOO));
    assert_eq!(mirror.pointer(), Some(&client_pointer));
    assert_eq!(
        mirror.arguments().get(&ClassId::from(FOO)),
        Some(&foo_args())
    );
    assert_eq!(
        mirror.state().get("Args"),
        Some(&StateValue::list(foo_args()))
    );
}

#[test]
fn test_unknown_pointer_falls_back_to_exact_identifier() {
    init_logging();
    let hub = LocalTransportHub::new();
    let mut server = start_server(&hub, server_protocol());

    let pointer = server.pointers_mut().create("slot-1").unwrap();
    let id = server.spawn(FOO, foo_args()).unwrap();
    server.attach_pointer(&id, &pointer).unwrap();
    server.start(&id).unwrap();

    let mut client = connect_client(&hub, &mut server, UserKey::new(1), client_protocol());
    exchange_packets(&mut server, &mut [&mut client]);

    let mirror = client.mirror(&id).unwrap();
    assert_eq!(mirror.class(), &ClassId::from(FOO));
    assert_eq!(mirror.pointer(), None);
    assert_eq!(mirror.arguments().get(&ClassId::from(FOO)), Some(&foo_args()));
}

#[test]
fn test_unbound_pointer_skips_mirror() {
    init_logging();
    let hub = LocalTransportHub::new();
    let mut server = start_server(&hub, server_protocol());

    let pointer = server.pointers_mut().create("slot-1").unwrap();
    let id = server.spawn(FOO, foo_args()).unwrap();
    server.attach_pointer(&id, &pointer).unwrap();
    server.start(&id).unwrap();

    let mut client = connect_client(&hub, &mut server, UserKey::new(1), client_protocol());
    client.pointers_mut().create("slot-1").unwrap();
    exchange_packets(&mut server, &mut [&mut client]);

    assert!(!client.mirror_exists(&id));
    assert!(client.is_synced());
}

#[test]
fn test_unknown_class_resolves_through_root() {
    init_logging();
    let hub = LocalTransportHub::new();
    let mut server = start_server(&hub, server_protocol());
    let id = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.start(&id).unwrap();

    let mut client = connect_client(&hub, &mut server, UserKey::new(1), client_protocol());
    exchange_packets(&mut server, &mut [&mut client]);

    assert_eq!(
        client.mirror(&id).map(|mirror| mirror.class().clone()),
        Some(ClassId::from(CLIENT_STORAGE))
    );
}

#[test]
fn test_pointer_cannot_be_rebound_to_another_class() {
    init_logging();
    let hub = LocalTransportHub::new();
    let mut server = start_server(&hub, server_protocol());

    let pointer = server.pointers_mut().create("slot-1").unwrap();
    let storage = server.spawn(SERVER_STORAGE, Vec::new()).unwrap();
    server.attach_pointer(&storage, &pointer).unwrap();

    let foo = server.spawn(FOO, foo_args()).unwrap();
    let result = server.attach_pointer(&foo, &pointer);

    assert!(matches!(
        result,
        Err(ServerError::Pointer(PointerError::AlreadyBound { .. }))
    ));
    assert!(server.entity(&foo).unwrap().pointer().is_none());
    assert_eq!(
        server.pointers().resolve(&pointer),
        Ok(&ClassId::from(SERVER_STORAGE))
    );
}

#[test]
fn test_attaching_missing_pointer_fails() {
    init_logging();
    let hub = LocalTransportHub::new();
    let mut server = start_server(&hub, server_protocol());

    let foreign_pointer = PointerRegistry::new().create("elsewhere").unwrap();
    let id = server.spawn(FOO, foo_args()).unwrap();

    assert!(matches!(
        server.attach_pointer(&id, &foreign_pointer),
        Err(ServerError::Pointer(PointerError::NotFound { .. }))
    ));
}
