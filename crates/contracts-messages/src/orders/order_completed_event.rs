//! Generated from `orders/order-completed-event`. Do not edit.

use serde::{Deserialize, Serialize};

/// Event published when an order has been completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCompletedEvent {
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
    #[serde(rename = "messageVersion", default = "order_completed_event_message_version")]
    pub message_version: String,
    /// Service that published the message.
    ///
    /// Always `"OrderService"`.
    #[serde(rename = "publishedBy", default = "order_completed_event_published_by")]
    pub published_by: String,
    /// Services that consume the message.
    ///
    /// Always `["PricingService", "AnalyticsService"]`.
    #[serde(rename = "consumedBy", default = "order_completed_event_consumed_by")]
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
    #[serde(rename = "isPublic", default = "order_completed_event_is_public")]
    pub is_public: bool,
    /// Order that was completed.
    #[serde(rename = "orderId")]
    pub order_id: ::uuid::Uuid,
    /// Quotation the order was created from.
    #[serde(rename = "quotationId")]
    pub quotation_id: ::uuid::Uuid,
    /// When the order was completed.
    #[serde(rename = "completedAt")]
    pub completed_at: ::chrono::DateTime<::chrono::Utc>,
    /// Whether the manufacturing job succeeded.
    #[serde(rename = "jobSucceeded")]
    pub job_succeeded: bool,
    /// Actual print time in hours.
    #[serde(rename = "actualPrintTimeHours", default, skip_serializing_if = "Option::is_none", with = "::rust_decimal::serde::arbitrary_precision_option")]
    pub actual_print_time_hours: Option<::rust_decimal::Decimal>,
    /// Actual total cost of the job.
    #[serde(rename = "actualTotalCost", default, skip_serializing_if = "Option::is_none", with = "::rust_decimal::serde::arbitrary_precision_option")]
    pub actual_total_cost: Option<::rust_decimal::Decimal>,
}

/// Default for `OrderCompletedEvent::message_version` when absent: `"1.0.0"`.
pub fn order_completed_event_message_version() -> String {
    "1.0.0".to_string()
}

/// Fixed value of `OrderCompletedEvent::published_by`: always `"OrderService"`.
pub fn order_completed_event_published_by() -> String {
    "OrderService".to_string()
}

/// Fixed value of `OrderCompletedEvent::consumed_by`: always `["PricingService", "AnalyticsService"]`.
pub fn order_completed_event_consumed_by() -> Vec<String> {
    vec!["PricingService".to_string(), "AnalyticsService".to_string()]
}

/// Default for `OrderCompletedEvent::is_public` when absent: `false`.
pub fn order_completed_event_is_public() -> bool {
    false
}
