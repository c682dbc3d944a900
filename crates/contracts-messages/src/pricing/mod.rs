//! Generated module index. Do not edit.

pub mod message_type;
pub mod price_adjustment;
pub mod price_calculated_event;
pub mod strategy;

pub use self::message_type::*;
pub use self::price_adjustment::*;
pub use self::price_calculated_event::*;
pub use self::strategy::*;
