//! Generated from `customers/nda-expiring-event`. Do not edit.

use serde::{Deserialize, Serialize};

/// Event published when an NDA is approaching expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdaExpiringEvent {
    /// Unique identifier for this message.
    #[serde(rename = "messageId")]
    pub message_id: ::uuid::Uuid,
    /// Logical name of the message.
    #[serde(rename = "messageName")]
    pub message_name: String,
    /// Whether the message is a command or an event.
    #[serde(rename = "messageType")]
    pub message_type: super::MessageType,
    /// Semantic version of the message contract.
    #[serde(rename = "messageVersion", default = "nda_expiring_event_message_version")]
    pub message_version: String,
    /// Service that published the message.
    ///
    /// Always `"CustomerService"`.
    #[serde(rename = "publishedBy", default = "nda_expiring_event_published_by")]
    pub published_by: String,
    /// Services that consume the message.
    ///
    /// Always `["NotificationService"]`.
    #[serde(rename = "consumedBy", default = "nda_expiring_event_consumed_by")]
    pub consumed_by: Vec<String>,
    /// Identifier shared by every message of one business flow.
    #[serde(rename = "correlationId")]
    pub correlation_id: ::uuid::Uuid,
    /// Identifier of the message that caused this one.
    #[serde(rename = "causationId", default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<::uuid::Uuid>,
    /// When the message was created.
    #[serde(rename = "timestamp")]
    pub timestamp: ::chrono::DateTime<::chrono::Utc>,
    /// Whether the message may leave the internal bus.
    #[serde(rename = "isPublic", default = "nda_expiring_event_is_public")]
    pub is_public: bool,
    #[serde(rename = "ndaId")]
    pub nda_id: ::uuid::Uuid,
    #[serde(rename = "customerId")]
    pub customer_id: ::uuid::Uuid,
    #[serde(rename = "expiresAt")]
    pub expires_at: ::chrono::DateTime<::chrono::Utc>,
    #[serde(rename = "daysUntilExpiration")]
    pub days_until_expiration: i64,
}

/// Default for `NdaExpiringEvent::message_version` when absent: `"1.0.0"`.
pub fn nda_expiring_event_message_version() -> String {
    "1.0.0".to_string()
}

/// Fixed value of `NdaExpiringEvent::published_by`: always `"CustomerService"`.
pub fn nda_expiring_event_published_by() -> String {
    "CustomerService".to_string()
}

/// Fixed value of `NdaExpiringEvent::consumed_by`: always `["NotificationService"]`.
pub fn nda_expiring_event_consumed_by() -> Vec<String> {
    vec!["NotificationService".to_string()]
}

/// Default for `NdaExpiringEvent::is_public` when absent: `false`.
pub fn nda_expiring_event_is_public() -> bool {
    false
}
