//! Screen/session state machine and port definitions for ussdflow.
//!
//! This crate defines the "ports" (store and cipher traits) that the
//! infrastructure layer implements, the immutable screen graph, and the
//! orchestrator that moves a session through it one inbound message at a
//! time. It depends only on `ussdflow-types` -- never on `ussdflow-infra` or
//! any database/IO crate.

pub mod cipher;
pub mod collect;
pub mod orchestrator;
pub mod screen;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
