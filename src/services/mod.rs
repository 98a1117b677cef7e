//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own poll state transitions and persistence so route
//! handlers can stay focused on request decoding and status mapping.

pub mod persistence;
pub mod poll;
pub mod session;
