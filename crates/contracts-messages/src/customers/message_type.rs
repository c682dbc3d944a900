//! Generated from `base-message`. Do not edit.

use serde::{Deserialize, Serialize};

/// Whether the message is a command or an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "Command")]
    Command,
    #[serde(rename = "Event")]
    Event,
}
