//! Generated from `shared/price-breakdown`. Do not edit.

use serde::{Deserialize, Serialize};

/// Itemized cost components of a calculated price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    #[serde(rename = "materialCost", with = "::rust_decimal::serde::arbitrary_precision")]
    pub material_cost: ::rust_decimal::Decimal,
    #[serde(rename = "machineTimeCost", with = "::rust_decimal::serde::arbitrary_precision")]
    pub machine_time_cost: ::rust_decimal::Decimal,
    #[serde(rename = "setupCost", with = "::rust_decimal::serde::arbitrary_precision")]
    pub setup_cost: ::rust_decimal::Decimal,
    #[serde(rename = "marginAmount", with = "::rust_decimal::serde::arbitrary_precision")]
    pub margin_amount: ::rust_decimal::Decimal,
    #[serde(rename = "totalPrice", with = "::rust_decimal::serde::arbitrary_precision")]
    pub total_price: ::rust_decimal::Decimal,
}
