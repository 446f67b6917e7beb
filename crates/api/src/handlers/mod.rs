//! HTTP request handlers, one module per resource.

pub mod dispatch;
pub mod health;
pub mod reminder;
pub mod streaks;
