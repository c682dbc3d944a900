//! Generated module index. Do not edit.

pub mod bounding_box;
pub mod file_analyzed_event;
pub mod message_type;

pub use self::bounding_box::*;
pub use self::file_analyzed_event::*;
pub use self::message_type::*;
