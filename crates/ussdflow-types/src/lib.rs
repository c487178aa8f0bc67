//! Shared domain types for ussdflow.
//!
//! This crate contains the data model shared by the state machine, the
//! storage adapters and the gateway: input descriptors, responses, session
//! identifiers, configuration and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod input;
pub mod response;
pub mod session;
