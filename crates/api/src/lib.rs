//! HTTP surface for the Daybook notification core.
//!
//! Exposes the dispatch trigger for the external scheduler, the
//! rate-limited custom-reminder CRUD for the UI collaborator, and the
//! streak read endpoint.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;
