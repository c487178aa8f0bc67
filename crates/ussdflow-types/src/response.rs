//! Outbound responses.

use serde::{Deserialize, Serialize};

/// Whether the conversation continues after this response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// The user is expected to answer.
    Continue,
    /// The conversation is over.
    End,
}

/// A user-facing message produced for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub kind: ResponseKind,
    pub text: String,
}

impl Response {
    /// A response that keeps the session open.
    pub fn con(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Continue,
            text: text.into(),
        }
    }

    /// A response that closes the session on the user's handset.
    pub fn end(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::End,
            text: text.into(),
        }
    }

    pub fn is_end(&self) -> bool {
        self.kind == ResponseKind::End
    }
}
