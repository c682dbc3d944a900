//! Generated from `geometry/file-analyzed-event`. Do not edit.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "x", with = "::rust_decimal::serde::arbitrary_precision")]
    pub x: ::rust_decimal::Decimal,
    #[serde(rename = "y", with = "::rust_decimal::serde::arbitrary_precision")]
    pub y: ::rust_decimal::Decimal,
    #[serde(rename = "z", with = "::rust_decimal::serde::arbitrary_precision")]
    pub z: ::rust_decimal::Decimal,
}
