//! Generated module index. Do not edit.

pub mod message_type;
pub mod order_completed_event;

pub use self::message_type::*;
pub use self::order_completed_event::*;
