use thiserror::Error;

/// Errors from repository operations (used by the store port in ussdflow-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found: {0}")]
    NotFound(String),
}

/// Errors from the value cipher.
///
/// IMPORTANT: These errors never include plaintext, key material, or ciphertext
/// in their Display/Debug output to prevent accidental logging of user input.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid ciphertext encoding")]
    InvalidEncoding,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("key unavailable: {0}")]
    KeyUnavailable(String),
}

/// Programmer errors: a malformed screen graph or an orchestrator bug.
///
/// These are never shown to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("input screen '{title}' has no inputs")]
    EmptyInputs { title: String },

    #[error("input screen '{title}' declares input '{name}' more than once")]
    DuplicateInput { title: String, name: String },

    #[error("input '{name}' declares an empty option list")]
    EmptyOptions { name: String },

    #[error("cursor {cursor} is outside the input list (len {len})")]
    CursorOutOfBounds { cursor: usize, len: usize },

    #[error("unknown screen '{0}'")]
    UnknownScreen(String),

    #[error("screen '{0}' registered more than once")]
    DuplicateScreen(String),

    #[error("root screen '{0}' is not registered")]
    MissingRoot(String),

    #[error("more than {0} consecutive screen redirects")]
    RedirectLimit(usize),

    #[error("stored cursor '{0}' is not a valid position")]
    CorruptCursor(String),
}

/// Coarse classification of a [`FlowError`], used by callers to decide
/// between re-prompting, aborting and retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input. Re-prompt, state is unchanged.
    Validation,
    /// Programmer error. Log and abort the request.
    Contract,
    /// Store, cipher or application behavior failed. Retry is up to the caller.
    Collaborator,
}

/// Every failure the state machine can report.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid selection")]
    InvalidSelection,

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("screen behavior failed: {0}")]
    Behavior(String),
}

impl FlowError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::InvalidSelection => ErrorKind::Validation,
            FlowError::Contract(_) => ErrorKind::Contract,
            FlowError::Store(_) | FlowError::Cipher(_) | FlowError::Behavior(_) => {
                ErrorKind::Collaborator
            }
        }
    }
}
