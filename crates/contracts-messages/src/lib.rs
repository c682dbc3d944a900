//! Generated module index. Do not edit.

pub mod customers;
pub mod geometry;
pub mod orders;
pub mod pricing;
pub mod shared;
