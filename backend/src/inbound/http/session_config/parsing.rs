//! Typed reads of `SESSION_*` variables with build-mode fallbacks.

use actix_web::cookie::SameSite;
use actix_web::cookie::time::Duration;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, DEFAULT_SESSION_TTL_SECONDS, SAMESITE_ENV, SessionConfigError, TTL_ENV};

const FLAG_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "a positive number of seconds";

/// Environment view that knows how strict to be.
pub(super) struct SessionEnv<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<'a, E: Env> SessionEnv<'a, E> {
    pub(super) const fn new(env: &'a E, mode: BuildMode) -> Self {
        Self { env, mode }
    }

    pub(super) const fn is_debug(&self) -> bool {
        matches!(self.mode, BuildMode::Debug)
    }

    pub(super) fn raw(&self, name: &str) -> Option<String> {
        self.env.string(name)
    }

    /// Debug builds log `error` and carry on with `fallback`; release builds
    /// fail with it.
    pub(super) fn tolerate<T>(
        &self,
        fallback: T,
        error: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        if self.is_debug() {
            warn!(%error, "session setting replaced by a development default");
            Ok(fallback)
        } else {
            Err(error)
        }
    }

    /// Boolean toggle; required in release builds.
    pub(super) fn flag(
        &self,
        name: &'static str,
        default: bool,
    ) -> Result<bool, SessionConfigError> {
        let Some(value) = self.raw(name) else {
            return self.tolerate(default, SessionConfigError::MissingEnv { name });
        };
        match parse_flag(&value) {
            Some(flag) => Ok(flag),
            None => self.tolerate(
                default,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: FLAG_EXPECTED,
                },
            ),
        }
    }

    /// `SameSite` policy. `None` is only accepted on secure cookies.
    pub(super) fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let fallback = if self.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(value) = self.raw(SAMESITE_ENV) else {
            return self.tolerate(fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => self.tolerate(SameSite::None, SessionConfigError::InsecureSameSiteNone),
            _ => self.tolerate(
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
            ),
        }
    }

    /// Session lifetime; optional in every build.
    pub(super) fn ttl(&self) -> Result<Duration, SessionConfigError> {
        let default = Duration::seconds(DEFAULT_SESSION_TTL_SECONDS);
        let Some(value) = self.raw(TTL_ENV) else {
            return Ok(default);
        };
        match value.trim().parse::<i64>() {
            Ok(seconds) if seconds > 0 => Ok(Duration::seconds(seconds)),
            _ => self.tolerate(
                default,
                SessionConfigError::InvalidEnv {
                    name: TTL_ENV,
                    value,
                    expected: TTL_EXPECTED,
                },
            ),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
