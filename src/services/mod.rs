//! Service layer: typed clients for the external backend-as-a-service and
//! the process-wide session holder.
//!
//! Everything durable lives on the provider side; these services only speak
//! its HTTP APIs and hold the one piece of shared in-memory state.

pub mod auth_client;
pub mod auth_flow;
pub mod session_service;
pub mod storage_client;
