//! Background organization sync
//!
//! The orchestrator runs one sync per trigger on a detached thread with its
//! own scheduler and its own data-access session, and always finishes by
//! writing one audit entry and notifying the initiating user.

pub mod bridge;
pub mod orchestrator;
pub mod ports;
pub mod run;
