//! HTTP layer for ussdflow.
//!
//! The USSD gateway callback at `POST /api/v1/ussd`, plus read-only JSON
//! endpoints under `/api/v1/` and `/health`.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
