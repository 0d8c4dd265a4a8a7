//! Data models and DTOs

pub mod borrow;
pub mod enums;
pub mod equipment;
pub mod user;
