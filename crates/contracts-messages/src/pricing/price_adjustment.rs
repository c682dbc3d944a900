//! Generated from `pricing/price-calculated-event`. Do not edit.

use serde::{Deserialize, Serialize};

/// A manual change to a calculated price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    #[serde(rename = "reason")]
    pub reason: String,
    #[serde(rename = "amount", with = "::rust_decimal::serde::arbitrary_precision")]
    pub amount: ::rust_decimal::Decimal,
}
