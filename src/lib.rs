//! Funeral Desk — access gating and wizard error resolution for the
//! funeral home CRM.

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod routing;
pub mod session;
pub mod wizard;
