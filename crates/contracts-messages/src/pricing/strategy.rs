//! Generated from `pricing/price-calculated-event`. Do not edit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "RuleBased")]
    RuleBased,
    #[serde(rename = "MachineLearning")]
    MachineLearning,
}
