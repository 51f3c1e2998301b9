//! Inputs for `create_server`.

use std::net::SocketAddr;

use clinic::inbound::http::session_config::SessionSettings;
use clinic::outbound::persistence::DbPool;

/// Where clinic records are kept.
pub enum Storage {
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
    /// Process memory; lost on restart.
    Memory,
}

/// Session, socket and storage choices for one server run.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
}

impl ServerConfig {
    #[must_use]
    pub const fn new(session: SessionSettings, bind_addr: SocketAddr, storage: Storage) -> Self {
        Self {
            session,
            bind_addr,
            storage,
        }
    }
}
