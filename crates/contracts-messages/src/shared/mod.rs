//! Generated module index. Do not edit.

pub mod price_breakdown;

pub use self::price_breakdown::*;
