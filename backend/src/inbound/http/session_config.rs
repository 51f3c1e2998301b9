//! Session cookie settings read from `SESSION_*` environment variables.
//!
//! Release builds require every toggle explicitly and reject weak keys.
//! Debug builds fall back to development defaults with a warning, and to an
//! ephemeral key when the default key file is missing.
//!
//! | Variable | Meaning | Debug default |
//! |----------|---------|---------------|
//! | `SESSION_KEY_FILE` | path to >= 64 bytes of key | `/var/run/secrets/session_key` |
//! | `SESSION_COOKIE_SECURE` | mark the cookie `Secure` | `true` |
//! | `SESSION_SAMESITE` | `Strict`, `Lax` or `None` | `Lax` |
//! | `SESSION_ALLOW_EPHEMERAL` | allow a generated key when the file is missing | `false` |
//! | `SESSION_TTL_SECONDS` | idle lifetime of a session | `7200` |

use std::path::PathBuf;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

mod parsing;

use parsing::SessionEnv;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
/// Two hours.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 2 * 60 * 60;
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const TTL_ENV: &str = "SESSION_TTL_SECONDS";

/// How strictly settings are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults with warnings.
    Debug,
    /// Explicit, valid settings or an error.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    ///
    /// # Examples
    /// ```
    /// use clinic::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Key for the private (encrypted) cookie.
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    /// Session lifetime, renewed on each request.
    pub ttl: Duration,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from `env`.
///
/// # Examples
/// ```
/// use clinic::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_ALLOW_EPHEMERAL" => Some("1".to_owned()),
///     "SESSION_KEY_FILE" => Some("/nonexistent/session_key".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).unwrap();
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.ttl.whole_hours(), 2);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let env = SessionEnv::new(env, mode);
    let cookie_secure = env.flag(COOKIE_SECURE_ENV, true)?;
    let same_site = env.same_site(cookie_secure)?;
    let allow_ephemeral = env.flag(ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !env.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(&env, allow_ephemeral)?;
    let ttl = env.ttl()?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl,
    })
}

fn session_key<E: Env>(
    env: &SessionEnv<'_, E>,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.raw(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if env.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key (dev only)"
            );
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };

    let length = bytes.len();
    let key = if length < SESSION_KEY_MIN_LEN {
        // `Key::derive_from` panics on short input.
        env.tolerate(
            Key::generate(),
            SessionConfigError::KeyTooShort {
                path,
                length,
                min_len: SESSION_KEY_MIN_LEN,
            },
        )
    } else {
        Ok(Key::derive_from(&bytes))
    };
    bytes.zeroize();
    key
}
