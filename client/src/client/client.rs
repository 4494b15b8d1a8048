use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    time::Instant,
};

use log::{info, trace, warn};

use replikit_shared::{
    decode, encode, ClientMessage, EntityError, HostType, InstanceDescriptor, InstanceId,
    InstanceIdGenerator, KeySetObserver, Pointer, PointerRegistry, Protocol, ServerMessage,
    SharedEntity, StateValue, Subscription, SyncPayload,
};

use crate::{
    events::ClientEvent,
    io::Io,
    mirror::{resolver, Mirror},
    request::InstanceListRequest,
    transport::{PacketReceiver, PacketSender},
    ClientConfig, ClientError, MirrorDispatchPolicy,
};

/// The mirrored side of replication. Learns which instances the server runs,
/// rebuilds them locally through the same class factories, and keeps them in
/// step with the snapshots and patches the server sends.
pub struct Client {
    // Config
    client_config: ClientConfig,
    protocol: Protocol,
    // Connection
    io: Io,
    outgoing_messages: VecDeque<ClientMessage>,
    pending_request: Option<InstanceListRequest>,
    next_request_id: u32,
    synced: bool,
    // World
    pointers: PointerRegistry,
    id_generator: InstanceIdGenerator,
    mirrors: BTreeMap<InstanceId, Mirror>,
    provisional_ids: HashMap<InstanceId, InstanceId>,
    known_instances: KeySetObserver<InstanceId>,
    // Events
    incoming_events: Vec<ClientEvent>,
}

impl Client {
    /// Create a new Client
    pub fn new<P: Into<Protocol>>(client_config: ClientConfig, protocol: P) -> Self {
        let mut protocol: Protocol = protocol.into();
        if !protocol.is_locked() {
            protocol.lock();
        }

        Self {
            client_config,
            protocol,
            io: Io::new(),
            outgoing_messages: VecDeque::new(),
            pending_request: None,
            next_request_id: fastrand::u32(..),
            synced: false,
            pointers: PointerRegistry::new(),
            id_generator: InstanceIdGenerator::new(HostType::Client),
            mirrors: BTreeMap::new(),
            provisional_ids: HashMap::new(),
            known_instances: KeySetObserver::new(),
            incoming_events: Vec::new(),
        }
    }

    /// Attaches the transport used by [`Client::receive_all_packets`] and
    /// [`Client::send_all_packets`]
    pub fn io_load(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        self.io.load(packet_sender, packet_receiver);
    }

    pub fn is_connected(&self) -> bool {
        self.io.is_loaded()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.client_config
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    // Instance list

    /// Asks the server for every instance this client may see. Used on
    /// connect and on reconnect; the answer replaces the set of mirrors.
    /// Returns the request id.
    pub fn request_all_instances(&mut self, now: Instant) -> u32 {
        let request_id = self.generate_request_id();
        self.pending_request = Some(InstanceListRequest::new(request_id, now));
        self.outgoing_messages
            .push_back(ClientMessage::GetAllInstances { request_id });
        request_id
    }

    /// Must be called regularly. Re-sends an unanswered bulk instance request
    /// once it times out.
    pub fn update(&mut self, now: Instant) -> Result<(), ClientError> {
        let timeout = self.client_config.instance_request_timeout;
        let Some(request) = self.pending_request.as_ref() else {
            return Ok(());
        };
        if !request.is_expired(now, timeout) {
            return Ok(());
        }

        let attempts = request.attempts();
        if let Some(max_attempts) = self.client_config.max_instance_request_attempts {
            if attempts >= max_attempts {
                self.pending_request = None;
                return Err(ClientError::InstanceListTimedOut { attempts });
            }
        }

        let request_id = self.generate_request_id();
        warn!(
            "Client: bulk instance request unanswered after {:?}, sending again (attempt {})",
            timeout,
            attempts + 1
        );
        if let Some(request) = self.pending_request.as_mut() {
            request.resend(request_id, now);
        }
        self.outgoing_messages
            .push_back(ClientMessage::GetAllInstances { request_id });
        Ok(())
    }

    /// Whether a bulk instance request has been answered since the last call
    /// to [`Client::request_all_instances`]
    pub fn is_synced(&self) -> bool {
        self.synced && self.pending_request.is_none()
    }

    pub fn pending_request_id(&self) -> Option<u32> {
        self.pending_request
            .as_ref()
            .map(InstanceListRequest::request_id)
    }

    fn generate_request_id(&mut self) -> u32 {
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        request_id
    }

    // Messages

    /// Handles one message from the server. Messages about unknown instances
    /// are ignored.
    pub fn receive_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::AllInstances {
                request_id,
                instances,
            } => self.receive_instance_list(request_id, instances),
            ServerMessage::CreatedNewInstance(descriptor) => {
                self.known_instances.insert(descriptor.id);
                if !self.mirrors.contains_key(&descriptor.id) {
                    self.create_mirror(&descriptor);
                }
            }
            ServerMessage::Dispatch { id, payload } => self.receive_payload(&id, payload),
            ServerMessage::DestroyInstance { id } => {
                self.known_instances.remove(&id);
                self.destroy_mirror(&id);
            }
        }
    }

    /// Must be called regularly, receives and handles every waiting packet.
    /// Returns how many messages were handled.
    pub fn receive_all_packets(&mut self) -> Result<usize, ClientError> {
        let mut handled = 0;

        loop {
            let decoded = match self.io.recv_packet()? {
                Some(payload) => decode::<ServerMessage>(payload),
                None => break,
            };

            match decoded {
                Ok(message) => {
                    self.receive_message(message);
                    handled += 1;
                }
                Err(error) => warn!("Client: dropping packet from server: {}", error),
            }
        }

        Ok(handled)
    }

    /// Sends every queued message through the transport. Returns how many
    /// packets were sent.
    pub fn send_all_packets(&mut self) -> Result<usize, ClientError> {
        if !self.io.is_loaded() {
            return Err(ClientError::IoNotLoaded);
        }

        let mut sent = 0;
        while let Some(message) = self.outgoing_messages.pop_front() {
            let payload = encode(&message)?;
            self.io.send_packet(&payload)?;
            sent += 1;
        }

        Ok(sent)
    }

    /// Drains every queued message, without going through the transport
    pub fn take_outgoing_messages(&mut self) -> Vec<ClientMessage> {
        self.outgoing_messages.drain(..).collect()
    }

    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.incoming_events)
    }

    fn receive_instance_list(&mut self, request_id: u32, instances: Vec<InstanceDescriptor>) {
        if self.pending_request_id() != Some(request_id) {
            trace!("Client: ignoring stale instance list {}", request_id);
            return;
        }
        self.pending_request = None;

        let changes = self
            .known_instances
            .sync(instances.iter().map(|descriptor| descriptor.id));
        for id in &changes.removed {
            self.destroy_mirror(id);
        }
        for descriptor in &instances {
            if self.mirrors.contains_key(&descriptor.id) {
                // the server forgets hydration on reconnect
                self.outgoing_messages
                    .push_back(ClientMessage::Start { id: descriptor.id });
            } else {
                self.create_mirror(descriptor);
            }
        }

        self.synced = true;
        info!("Client: received {} live instances", instances.len());
        self.incoming_events.push(ClientEvent::InstanceListReceived {
            request_id,
            count: instances.len(),
        });
    }

    fn receive_payload(&mut self, id: &InstanceId, payload: SyncPayload) {
        let Some(mirror) = self.mirrors.get_mut(id) else {
            trace!("Client: payload for unknown instance {}", id);
            return;
        };
        if mirror.blocks_server_dispatches() {
            trace!("Client: {} blocks server payloads", id);
            return;
        }

        let next = match &payload {
            SyncPayload::Init(state) => state.clone(),
            SyncPayload::Patch(_) if !mirror.is_hydrated() => {
                trace!("Client: patch for {} arrived before its hydration", id);
                return;
            }
            SyncPayload::Patch(_) => payload.apply_to(mirror.confirmed_state()),
        };

        if let Err(error) = mirror.entity_mut().set_state(next.clone()) {
            warn!("Client: {}", error);
            return;
        }
        mirror.set_confirmed_state(next);

        if payload.is_init() && !mirror.is_hydrated() {
            mirror.set_hydrated();
            self.incoming_events
                .push(ClientEvent::InstanceHydrated { id: *id });
        }
    }

    fn create_mirror(&mut self, descriptor: &InstanceDescriptor) {
        let resolution = match resolver::resolve(self.protocol.classes(), &self.pointers, descriptor)
        {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!(
                    "Client: cannot create mirror of {} ({}): {}",
                    descriptor.id, descriptor.identifier, error
                );
                return;
            }
        };

        let constructed = match self
            .protocol
            .classes()
            .construct(&resolution.class, resolution.args)
        {
            Ok(constructed) => constructed,
            Err(error) => {
                warn!("Client: cannot construct {}: {}", resolution.class, error);
                return;
            }
        };

        let provisional_id = self.id_generator.generate();
        let mut entity = SharedEntity::new(HostType::Client, provisional_id, constructed);
        if let Err(error) = start_mirror(&mut entity, descriptor.id, resolution.pointer) {
            warn!("Client: cannot start mirror of {}: {}", descriptor.id, error);
            return;
        }

        let class = entity.class().clone();
        self.provisional_ids.insert(provisional_id, descriptor.id);
        self.mirrors
            .insert(descriptor.id, Mirror::new(entity, provisional_id));
        self.outgoing_messages
            .push_back(ClientMessage::Start { id: descriptor.id });
        self.incoming_events.push(ClientEvent::InstanceCreated {
            id: descriptor.id,
            class,
        });
    }

    fn destroy_mirror(&mut self, id: &InstanceId) -> bool {
        let Some(mut mirror) = self.mirrors.remove(id) else {
            trace!("Client: destroy for unknown instance {}", id);
            return false;
        };

        mirror.entity_mut().destroy();
        self.provisional_ids.remove(&mirror.provisional_id());
        self.incoming_events
            .push(ClientEvent::InstanceDestroyed { id: *id });
        true
    }

    // Pointers

    pub fn pointers(&self) -> &PointerRegistry {
        &self.pointers
    }

    pub fn pointers_mut(&mut self) -> &mut PointerRegistry {
        &mut self.pointers
    }

    // Mirrors

    pub fn mirror(&self, id: &InstanceId) -> Option<&Mirror> {
        self.mirrors.get(id)
    }

    pub fn mirror_exists(&self, id: &InstanceId) -> bool {
        self.mirrors.contains_key(id)
    }

    /// Ids of every mirror, oldest first
    pub fn mirror_ids(&self) -> Vec<InstanceId> {
        self.mirrors.keys().copied().collect()
    }

    pub fn mirrors_count(&self) -> usize {
        self.mirrors.len()
    }

    pub fn state(&self, id: &InstanceId) -> Option<&StateValue> {
        self.mirrors.get(id).map(Mirror::state)
    }

    /// Maps a provisional client id to the server id that replaced it
    pub fn resolve_id(&self, provisional_id: &InstanceId) -> Option<InstanceId> {
        self.provisional_ids.get(provisional_id).copied()
    }

    pub fn subscribe<S, L>(
        &self,
        id: &InstanceId,
        selector: S,
        listener: L,
    ) -> Result<Subscription, ClientError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        let mirror = self.mirror_or_err(id)?;
        Ok(mirror.entity().subscribe(selector, listener)?)
    }

    pub fn subscribe_if<S, P, L>(
        &self,
        id: &InstanceId,
        selector: S,
        predicate: P,
        listener: L,
    ) -> Result<Subscription, ClientError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        P: Fn(&StateValue, &StateValue) -> bool + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        let mirror = self.mirror_or_err(id)?;
        Ok(mirror.entity().subscribe_if(selector, predicate, listener)?)
    }

    /// Ignores server payloads for one mirror while `block` is set
    pub fn set_block_server_dispatches(
        &mut self,
        id: &InstanceId,
        block: bool,
    ) -> Result<(), ClientError> {
        let mirror = self
            .mirrors
            .get_mut(id)
            .ok_or_else(|| ClientError::InstanceNotFound { id: id.to_string() })?;
        mirror.set_block_server_dispatches(block);
        Ok(())
    }

    /// Changes a mirror's state locally, when the
    /// [`MirrorDispatchPolicy`] allows it
    pub fn dispatch(&mut self, id: &InstanceId, state: StateValue) -> Result<bool, ClientError> {
        if self.client_config.mirror_dispatch == MirrorDispatchPolicy::Reject {
            return Err(ClientError::MirrorDispatchRejected { id: id.to_string() });
        }

        let mirror = self
            .mirrors
            .get_mut(id)
            .ok_or_else(|| ClientError::InstanceNotFound { id: id.to_string() })?;
        Ok(mirror.entity_mut().set_state(state)?)
    }

    pub fn update_state<F>(&mut self, id: &InstanceId, action: F) -> Result<bool, ClientError>
    where
        F: FnOnce(&StateValue) -> StateValue,
    {
        let next = action(self.mirror_or_err(id)?.state());
        self.dispatch(id, next)
    }

    fn mirror_or_err(&self, id: &InstanceId) -> Result<&Mirror, ClientError> {
        self.mirrors
            .get(id)
            .ok_or_else(|| ClientError::InstanceNotFound { id: id.to_string() })
    }
}

fn start_mirror(
    entity: &mut SharedEntity,
    id: InstanceId,
    pointer: Option<Pointer>,
) -> Result<(), EntityError> {
    entity.confirm_id(id)?;
    entity.set_pointer(pointer)?;
    entity.start()?;
    Ok(())
}
