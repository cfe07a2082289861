//! Listener and session settings handed to [`super::create_server`].

use std::net::SocketAddr;

use transport_portal::inbound::http::session_config::SessionSettings;

/// Everything the HTTP server needs besides the handler state.
#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Pair validated session settings with the listen address.
    #[must_use]
    pub const fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self { session, bind_addr }
    }
}
