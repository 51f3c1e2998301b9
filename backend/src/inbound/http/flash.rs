//! One-shot messages carried in the session between a redirect and the next
//! page that reads them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// Message shown once on the page following a redirect.
///
/// # Examples
/// ```
/// use clinic::inbound::http::flash::{FlashLevel, FlashMessage};
///
/// let flash = FlashMessage::error("You cannot edit an appointment that is not yours.");
/// assert_eq!(flash.level, FlashLevel::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlashMessage {
    pub level: FlashLevel,
    #[schema(example = "Your appointment has been successfully cancelled.")]
    pub message: String,
}

impl FlashMessage {
    /// Success-level message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// Error-level message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}
