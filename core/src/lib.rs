//! Core of the OMTeam AI gateway.
//!
//! Each operation turns a typed request into an instruction plus auxiliary
//! context for the external agent, then recovers and validates a typed result
//! from the agent's free-text reply. See [`pipeline::dispatch`].

pub mod analysis;
pub mod chat;
pub mod context;
pub mod contract;
pub mod enums;
pub mod error;
pub mod missions;
pub mod operation;
pub mod pipeline;
pub mod reply;
