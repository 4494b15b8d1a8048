use std::collections::{BTreeMap, HashMap};

use log::{info, trace, warn};

use replikit_shared::{
    decode, encode, ClassId, ClientMessage, HostType, InstanceDescriptor, InstanceId,
    InstanceIdGenerator, Pointer, PointerRegistry, Protocol, ServerMessage, SharedEntity,
    StateValue, Subscription, SyncPayload, UserKey,
};

use crate::{
    directory::instance_directory::InstanceDirectory,
    io::Io,
    transport::{PacketReceiver, PacketSender},
    user::{User, UserRef},
    world::{entity_mut::EntityMut, entity_ref::EntityRef},
    ServerConfig, ServerError,
};

/// The authoritative side of replication. Owns every shared instance, keeps
/// track of which connected users may see which instance, and queues the
/// messages that keep their mirrors in sync.
pub struct Server {
    // Config
    server_config: ServerConfig,
    protocol: Protocol,
    // Connection
    io: Io,
    users: BTreeMap<UserKey, User>,
    // World
    pointers: PointerRegistry,
    entities: HashMap<InstanceId, SharedEntity>,
    id_generator: InstanceIdGenerator,
    directory: InstanceDirectory,
}

impl Server {
    /// Create a new Server
    pub fn new<P: Into<Protocol>>(server_config: ServerConfig, protocol: P) -> Self {
        let mut protocol: Protocol = protocol.into();
        if !protocol.is_locked() {
            protocol.lock();
        }

        Self {
            server_config,
            protocol,
            io: Io::new(),
            users: BTreeMap::new(),
            pointers: PointerRegistry::new(),
            entities: HashMap::new(),
            id_generator: InstanceIdGenerator::new(HostType::Server),
            directory: InstanceDirectory::new(),
        }
    }

    /// Attaches the transport used by [`Server::receive_all_packets`] and
    /// [`Server::send_all_packets`]
    pub fn io_load(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        self.io.load(packet_sender, packet_receiver);
    }

    /// Returns whether or not the Server has a transport to talk through
    pub fn is_listening(&self) -> bool {
        self.io.is_loaded()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.server_config
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    // Users

    /// Registers a connected user. Returns `false` if it was already
    /// connected.
    pub fn connect_user(&mut self, user_key: &UserKey) -> bool {
        if self.users.contains_key(user_key) {
            return false;
        }

        info!("Server: user {} connected", user_key);
        self.users.insert(*user_key, User::new(*user_key));
        true
    }

    /// Drops a user and everything the server remembered about what it was
    /// sent. A reconnecting user starts from scratch.
    pub fn disconnect_user(&mut self, user_key: &UserKey) -> bool {
        if self.users.remove(user_key).is_none() {
            return false;
        }

        self.directory.forget_user(user_key);
        info!("Server: user {} disconnected", user_key);
        true
    }

    pub fn user_exists(&self, user_key: &UserKey) -> bool {
        self.users.contains_key(user_key)
    }

    pub fn user_keys(&self) -> Vec<UserKey> {
        self.users.keys().copied().collect()
    }

    pub fn user(&self, user_key: &UserKey) -> Option<UserRef<'_>> {
        self.users
            .get(user_key)
            .map(|user| UserRef::new(self, user))
    }

    pub fn users_count(&self) -> usize {
        self.users.len()
    }

    /// Drains every message queued for `user_key`, without going through the
    /// transport
    pub fn take_outgoing_messages(&mut self, user_key: &UserKey) -> Vec<ServerMessage> {
        self.users
            .get_mut(user_key)
            .map(User::take_outgoing_messages)
            .unwrap_or_default()
    }

    // Pointers

    pub fn pointers(&self) -> &PointerRegistry {
        &self.pointers
    }

    pub fn pointers_mut(&mut self) -> &mut PointerRegistry {
        &mut self.pointers
    }

    // Entities

    /// Constructs an instance of `class`. The instance is replicated once
    /// [`Server::start`] is called.
    pub fn spawn(
        &mut self,
        class: impl Into<ClassId>,
        args: Vec<StateValue>,
    ) -> Result<InstanceId, ServerError> {
        let class = class.into();
        let constructed = self.protocol.classes().construct(&class, args)?;
        let id = self.id_generator.generate();

        self.entities
            .insert(id, SharedEntity::new(HostType::Server, id, constructed));
        info!("Server: spawned {} ({})", id, class);
        Ok(id)
    }

    /// Starts an instance: registers it in the directory and announces it to
    /// every user allowed to see it. Starting twice is a no-op.
    pub fn start(&mut self, id: &InstanceId) -> Result<bool, ServerError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| ServerError::InstanceNotFound { id: id.to_string() })?;

        if !entity.start()? {
            return Ok(false);
        }

        self.directory.register_instance(*id, entity.state().clone());

        if self.server_config.announce_new_instances {
            let descriptor = entity.describe();
            for (user_key, user) in self.users.iter_mut() {
                if !entity.resolve_replication_for_player(user_key) {
                    continue;
                }
                self.directory.mark_visible(id, user_key);
                user.queue_message(ServerMessage::CreatedNewInstance(descriptor.clone()));
            }
        }

        Ok(true)
    }

    /// Replaces the state of an instance. When it is started and something
    /// changed, a patch goes out to every user that hydrated it.
    pub fn dispatch(&mut self, id: &InstanceId, state: StateValue) -> Result<bool, ServerError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| ServerError::InstanceNotFound { id: id.to_string() })?;

        if !entity.set_state(state)? {
            trace!("Server: dispatch to {} changed nothing", id);
            return Ok(false);
        }

        self.broadcast_state(id);
        Ok(true)
    }

    pub fn update<F>(&mut self, id: &InstanceId, action: F) -> Result<bool, ServerError>
    where
        F: FnOnce(&StateValue) -> StateValue,
    {
        let current = self
            .state(id)
            .ok_or_else(|| ServerError::InstanceNotFound { id: id.to_string() })?;
        let next = action(current);
        self.dispatch(id, next)
    }

    pub fn subscribe<S, L>(
        &self,
        id: &InstanceId,
        selector: S,
        listener: L,
    ) -> Result<Subscription, ServerError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| ServerError::InstanceNotFound { id: id.to_string() })?;
        Ok(entity.subscribe(selector, listener)?)
    }

    pub fn subscribe_if<S, P, L>(
        &self,
        id: &InstanceId,
        selector: S,
        predicate: P,
        listener: L,
    ) -> Result<Subscription, ServerError>
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        P: Fn(&StateValue, &StateValue) -> bool + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| ServerError::InstanceNotFound { id: id.to_string() })?;
        Ok(entity.subscribe_if(selector, predicate, listener)?)
    }

    /// Tags an instance with a pointer, binding the pointer to the instance's
    /// class
    pub fn attach_pointer(&mut self, id: &InstanceId, pointer: &Pointer) -> Result<(), ServerError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| ServerError::InstanceNotFound { id: id.to_string() })?;

        self.pointers.bind(pointer, entity.class())?;
        entity.set_pointer(Some(pointer.clone()))?;
        Ok(())
    }

    /// Destroys an instance and tells every user it was visible to. Destroying
    /// an instance that is already gone is a no-op.
    pub fn destroy(&mut self, id: &InstanceId) -> Result<bool, ServerError> {
        let Some(mut entity) = self.entities.remove(id) else {
            if self.id_generator.issued(id) {
                trace!("Server: {} is already destroyed", id);
                return Ok(false);
            }
            return Err(ServerError::InstanceNotFound { id: id.to_string() });
        };

        entity.destroy();

        if let Some(visible_users) = self.directory.unregister_instance(id) {
            for user_key in visible_users {
                if let Some(user) = self.users.get_mut(&user_key) {
                    user.queue_message(ServerMessage::DestroyInstance { id: *id });
                }
            }
        }

        Ok(true)
    }

    pub fn entity(&self, id: &InstanceId) -> Option<EntityRef<'_>> {
        self.entities.get(id).map(EntityRef::new)
    }

    pub fn entity_mut(&mut self, id: &InstanceId) -> Option<EntityMut<'_>> {
        if !self.entities.contains_key(id) {
            return None;
        }
        Some(EntityMut::new(self, id))
    }

    pub fn entity_exists(&self, id: &InstanceId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn state(&self, id: &InstanceId) -> Option<&StateValue> {
        self.entities.get(id).map(SharedEntity::state)
    }

    pub fn entities_count(&self) -> usize {
        self.entities.len()
    }

    pub fn directory(&self) -> &InstanceDirectory {
        &self.directory
    }

    /// Descriptors of every started instance `user_key` may see, oldest first
    pub fn instance_descriptors_for(&self, user_key: &UserKey) -> Vec<InstanceDescriptor> {
        self.directory
            .ids()
            .filter_map(|id| self.entities.get(id))
            .filter(|entity| entity.resolve_replication_for_player(user_key))
            .map(SharedEntity::describe)
            .collect()
    }

    // Messages

    /// Handles one message from a connected user
    pub fn receive_message(
        &mut self,
        user_key: &UserKey,
        message: ClientMessage,
    ) -> Result<(), ServerError> {
        if !self.users.contains_key(user_key) {
            return Err(ServerError::UserNotFound {
                user: user_key.to_string(),
            });
        }

        match message {
            ClientMessage::Start { id } => self.hydrate(user_key, &id),
            ClientMessage::GetAllInstances { request_id } => {
                self.answer_instance_request(user_key, request_id)
            }
        }

        Ok(())
    }

    /// Must be called regularly, receives and handles every waiting packet.
    /// Returns how many messages were handled.
    pub fn receive_all_packets(&mut self) -> Result<usize, ServerError> {
        let mut handled = 0;

        loop {
            let (user_key, decoded) = match self.io.recv_packet()? {
                Some((user_key, payload)) => (user_key, decode::<ClientMessage>(payload)),
                None => break,
            };

            let message = match decoded {
                Ok(message) => message,
                Err(error) => {
                    warn!("Server: dropping packet from {}: {}", user_key, error);
                    continue;
                }
            };

            if let Err(error) = self.receive_message(&user_key, message) {
                warn!("Server: {}", error);
                continue;
            }
            handled += 1;
        }

        Ok(handled)
    }

    /// Sends every queued message through the transport. Returns how many
    /// packets were sent.
    pub fn send_all_packets(&mut self) -> Result<usize, ServerError> {
        if !self.io.is_loaded() {
            return Err(ServerError::IoNotLoaded);
        }

        let mut sent = 0;
        for (user_key, user) in self.users.iter_mut() {
            for message in user.take_outgoing_messages() {
                let payload = encode(&message)?;
                self.io.send_packet(user_key, &payload)?;
                sent += 1;
            }
        }

        Ok(sent)
    }

    // Replication

    fn hydrate(&mut self, user_key: &UserKey, id: &InstanceId) {
        let Some(entity) = self.entities.get(id) else {
            trace!("Server: {} asked to start unknown instance {}", user_key, id);
            return;
        };
        let Some(snapshot) = self.directory.snapshot(id) else {
            trace!("Server: {} asked to start unstarted instance {}", user_key, id);
            return;
        };
        if !entity.resolve_replication_for_player(user_key) {
            trace!("Server: {} is not allowed to see {}", user_key, id);
            return;
        }

        let payload = SyncPayload::Init(snapshot.clone());
        if !entity.resolve_is_sync_for_player(user_key, &payload) {
            return;
        }
        let payload = entity.resolve_sync_for_player(user_key, payload);

        self.directory.mark_hydrated(id, user_key);
        if let Some(user) = self.users.get_mut(user_key) {
            user.queue_message(ServerMessage::Dispatch { id: *id, payload });
        }
    }

    fn answer_instance_request(&mut self, user_key: &UserKey, request_id: u32) {
        let ids: Vec<InstanceId> = self.directory.ids().copied().collect();
        let mut instances = Vec::new();

        for id in ids {
            let Some(entity) = self.entities.get(&id) else {
                continue;
            };
            if entity.resolve_replication_for_player(user_key) {
                self.directory.mark_visible(&id, user_key);
                instances.push(entity.describe());
            } else {
                self.directory.forget(&id, user_key);
            }
        }

        if let Some(user) = self.users.get_mut(user_key) {
            user.queue_message(ServerMessage::AllInstances {
                request_id,
                instances,
            });
        }
    }

    /// Sends the latest change of `id` to every user, re-evaluating who may
    /// see it
    fn broadcast_state(&mut self, id: &InstanceId) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        let Some(patch) = self.directory.record_state(id, entity.state().clone()) else {
            // not started yet
            return;
        };

        for (user_key, user) in self.users.iter_mut() {
            let visible = entity.resolve_replication_for_player(user_key);
            let was_visible = self.directory.is_visible(id, user_key);

            let message = match (visible, was_visible) {
                (true, false) => {
                    if !self.server_config.announce_new_instances {
                        continue;
                    }
                    self.directory.mark_visible(id, user_key);
                    ServerMessage::CreatedNewInstance(entity.describe())
                }
                (false, true) => {
                    self.directory.forget(id, user_key);
                    ServerMessage::DestroyInstance { id: *id }
                }
                (true, true) => {
                    if !self.directory.is_hydrated(id, user_key) {
                        continue;
                    }
                    let payload = SyncPayload::Patch(patch.clone());
                    if !entity.resolve_is_sync_for_player(user_key, &payload) {
                        continue;
                    }
                    ServerMessage::Dispatch {
                        id: *id,
                        payload: entity.resolve_sync_for_player(user_key, payload),
                    }
                }
                (false, false) => continue,
            };

            user.queue_message(message);
        }
    }
}
