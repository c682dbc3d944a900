//! Generated module index. Do not edit.

pub mod message_type;
pub mod nda_expiring_event;

pub use self::message_type::*;
pub use self::nda_expiring_event::*;
