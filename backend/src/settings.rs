//! Server settings loaded via OrthoConfig.
//!
//! Values come from `CLINIC_*` environment variables, command-line flags or a
//! configuration file, in the usual OrthoConfig precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Settings for the clinic server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct ClinicSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Connections kept open while idle.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
}

impl ClinicSettings {
    /// Configured address, or `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDR))
    }

    /// Pool settings when a non-blank database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())?;
        let mut config = PoolConfig::new(url).with_max_size(self.pool_max_size);
        if let Some(min_idle) = self.pool_min_idle {
            config = config.with_min_idle(Some(min_idle));
        }
        if let Some(secs) = self.pool_timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClinicSettings {
        ClinicSettings::load_from_iter([OsString::from("clinic")]).expect("config should load")
    }

    #[rstest]
    fn defaults_run_in_memory_on_port_8080() {
        let _guard = lock_env([
            ("CLINIC_BIND_ADDR", None::<String>),
            ("CLINIC_DATABASE_URL", None::<String>),
            ("CLINIC_POOL_MAX_SIZE", None::<String>),
            ("CLINIC_POOL_MIN_IDLE", None::<String>),
            ("CLINIC_POOL_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(settings.pool_max_size, 10);
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    fn database_url_alone_uses_the_default_pool_size() {
        let _guard = lock_env([
            ("CLINIC_BIND_ADDR", None::<String>),
            (
                "CLINIC_DATABASE_URL",
                Some("postgres://clinic@localhost/clinic".to_owned()),
            ),
            ("CLINIC_POOL_MAX_SIZE", None::<String>),
            ("CLINIC_POOL_MIN_IDLE", None::<String>),
            ("CLINIC_POOL_TIMEOUT_SECS", None::<String>),
        ]);

        let pool = load_from_empty_args().pool_config().expect("pool config");
        assert_eq!(pool.max_size(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CLINIC_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "CLINIC_DATABASE_URL",
                Some("postgres://clinic@localhost/clinic".to_owned()),
            ),
            ("CLINIC_POOL_MAX_SIZE", Some("4".to_owned())),
            ("CLINIC_POOL_MIN_IDLE", Some("0".to_owned())),
            ("CLINIC_POOL_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), "127.0.0.1:9000");
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://clinic@localhost/clinic");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.min_idle(), Some(0));
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let _guard = lock_env([
            ("CLINIC_BIND_ADDR", None::<String>),
            ("CLINIC_DATABASE_URL", Some("   ".to_owned())),
            ("CLINIC_POOL_MAX_SIZE", None::<String>),
            ("CLINIC_POOL_MIN_IDLE", None::<String>),
            ("CLINIC_POOL_TIMEOUT_SECS", None::<String>),
        ]);

        assert!(load_from_empty_args().pool_config().is_none());
    }
}
