//! Generated from `geometry/file-analyzed-event`. Do not edit.

use serde::{Deserialize, Serialize};

/// Event published when a file has been analyzed for geometric properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalyzedEvent {
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
    #[serde(rename = "messageVersion", default = "file_analyzed_event_message_version")]
    pub message_version: String,
    /// Service that published the message.
    ///
    /// Always `"GeometryService"`.
    #[serde(rename = "publishedBy", default = "file_analyzed_event_published_by")]
    pub published_by: String,
    /// Services that consume the message.
    ///
    /// Always `["PricingService", "UploadService"]`.
    #[serde(rename = "consumedBy", default = "file_analyzed_event_consumed_by")]
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
    #[serde(rename = "isPublic", default = "file_analyzed_event_is_public")]
    pub is_public: bool,
    /// Analyzed file.
    #[serde(rename = "fileId")]
    pub file_id: ::uuid::Uuid,
    /// Owner of the file.
    #[serde(rename = "customerId")]
    pub customer_id: ::uuid::Uuid,
    /// Model volume in cubic centimeters.
    #[serde(rename = "volumeCm3", with = "::rust_decimal::serde::arbitrary_precision")]
    pub volume_cm3: ::rust_decimal::Decimal,
    /// Support material volume in cubic centimeters.
    #[serde(rename = "supportVolumeCm3", with = "::rust_decimal::serde::arbitrary_precision")]
    pub support_volume_cm3: ::rust_decimal::Decimal,
    #[serde(rename = "surfaceAreaCm2", with = "::rust_decimal::serde::arbitrary_precision")]
    pub surface_area_cm2: ::rust_decimal::Decimal,
    /// Slice heights in millimeters, bottom to top.
    #[serde(rename = "layerHeightsMm", with = "decimal_list")]
    pub layer_heights_mm: Vec<::rust_decimal::Decimal>,
    /// Axis-aligned bounding box in millimeters.
    #[serde(rename = "boundingBox")]
    pub bounding_box: super::BoundingBox,
    #[serde(rename = "isManifold")]
    pub is_manifold: bool,
    #[serde(rename = "triangleCount")]
    pub triangle_count: i64,
    #[serde(rename = "analyzedAt")]
    pub analyzed_at: ::chrono::DateTime<::chrono::Utc>,
}

/// Default for `FileAnalyzedEvent::message_version` when absent: `"1.0.0"`.
pub fn file_analyzed_event_message_version() -> String {
    "1.0.0".to_string()
}

/// Fixed value of `FileAnalyzedEvent::published_by`: always `"GeometryService"`.
pub fn file_analyzed_event_published_by() -> String {
    "GeometryService".to_string()
}

/// Fixed value of `FileAnalyzedEvent::consumed_by`: always `["PricingService", "UploadService"]`.
pub fn file_analyzed_event_consumed_by() -> Vec<String> {
    vec!["PricingService".to_string(), "UploadService".to_string()]
}

/// Default for `FileAnalyzedEvent::is_public` when absent: `false`.
pub fn file_analyzed_event_is_public() -> bool {
    false
}

/// Lists of decimals as exact JSON numbers.
mod decimal_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    struct Exact(#[serde(with = "::rust_decimal::serde::arbitrary_precision")] ::rust_decimal::Decimal);

    pub fn serialize<S: Serializer>(values: &[::rust_decimal::Decimal], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().copied().map(Exact))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<::rust_decimal::Decimal>, D::Error> {
        let values = Vec::<Exact>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|Exact(value)| value).collect())
    }
}
