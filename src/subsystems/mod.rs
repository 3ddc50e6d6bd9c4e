//! Subsystems of the relay.

pub mod chat;
pub mod comms;
pub mod render;
pub mod runtime;
