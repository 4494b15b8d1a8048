pub mod test_protocol;

pub use helpers::*;
pub use local_socket::LocalTransportHub;
pub use test_protocol::{client_protocol, server_protocol};
