//! Generated from `pricing/price-calculated-event`. Do not edit.

use serde::{Deserialize, Serialize};

/// Event published when a price calculation has been performed and audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCalculatedEvent {
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
    #[serde(rename = "messageVersion", default = "price_calculated_event_message_version")]
    pub message_version: String,
    /// Service that published the message.
    ///
    /// Always `"PricingService"`.
    #[serde(rename = "publishedBy", default = "price_calculated_event_published_by")]
    pub published_by: String,
    /// Services that consume the message.
    ///
    /// Always `["OrderService"]`.
    #[serde(rename = "consumedBy", default = "price_calculated_event_consumed_by")]
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
    #[serde(rename = "isPublic", default = "price_calculated_event_is_public")]
    pub is_public: bool,
    #[serde(rename = "pricingAuditId")]
    pub pricing_audit_id: ::uuid::Uuid,
    #[serde(rename = "quotationId", default, skip_serializing_if = "Option::is_none")]
    pub quotation_id: Option<::uuid::Uuid>,
    /// Number of units priced.
    #[serde(rename = "quantity")]
    pub quantity: i64,
    #[serde(rename = "strategy")]
    pub strategy: super::Strategy,
    /// Model version when priced by machine learning.
    #[serde(rename = "mlModelVersion", default, skip_serializing_if = "Option::is_none")]
    pub ml_model_version: Option<String>,
    #[serde(rename = "confidenceLevel", with = "::rust_decimal::serde::arbitrary_precision")]
    pub confidence_level: ::rust_decimal::Decimal,
    #[serde(rename = "breakdown")]
    pub breakdown: super::super::shared::PriceBreakdown,
    /// Manual adjustments applied after calculation.
    #[serde(rename = "adjustments", default, skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<Vec<super::PriceAdjustment>>,
    #[serde(rename = "totalPrice", with = "::rust_decimal::serde::arbitrary_precision")]
    pub total_price: ::rust_decimal::Decimal,
    #[serde(rename = "currency", default = "price_calculated_event_currency")]
    pub currency: String,
    #[serde(rename = "validUntil")]
    pub valid_until: ::chrono::DateTime<::chrono::Utc>,
}

/// Default for `PriceCalculatedEvent::message_version` when absent: `"1.0.0"`.
pub fn price_calculated_event_message_version() -> String {
    "1.0.0".to_string()
}

/// Fixed value of `PriceCalculatedEvent::published_by`: always `"PricingService"`.
pub fn price_calculated_event_published_by() -> String {
    "PricingService".to_string()
}

/// Fixed value of `PriceCalculatedEvent::consumed_by`: always `["OrderService"]`.
pub fn price_calculated_event_consumed_by() -> Vec<String> {
    vec!["OrderService".to_string()]
}

/// Default for `PriceCalculatedEvent::is_public` when absent: `false`.
pub fn price_calculated_event_is_public() -> bool {
    false
}

/// Default for `PriceCalculatedEvent::currency` when absent: `"THB"`.
pub fn price_calculated_event_currency() -> String {
    "THB".to_string()
}
