//! Span field names recorded after a span is opened.
//!
//! Spans declare their fields up front with dotted names
//! (`ussd.response_kind = tracing::field::Empty`); these constants are the
//! names handed to `Span::record` once the value is known.

/// `con` or `end`.
pub const RESPONSE_KIND: &str = "ussd.response_kind";

/// Error category: `validation`, `contract` or `collaborator`.
pub const ERROR_KIND: &str = "ussd.error_kind";
