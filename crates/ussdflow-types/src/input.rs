//! Input descriptors: the named values an input screen collects.

use serde::{Deserialize, Serialize};

use crate::error::ContractViolation;

/// One selectable option of an input.
///
/// `value` is what gets stored; `display_value` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOption {
    pub value: String,
    pub display_value: String,
}

impl InputOption {
    pub fn new(value: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_value: display_value.into(),
        }
    }
}

/// Describes one named value to collect from the user.
///
/// `name` doubles as the store field name, so it must be stable across
/// deployments while sessions are still live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub name: String,
    pub display_name: String,
    /// When present, the user answers with a 1-based ordinal into this list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<InputOption>>,
    /// Never persist the raw value in clear text.
    #[serde(default)]
    pub encrypt: bool,
}

impl InputDescriptor {
    /// A free-text, unencrypted input.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            options: None,
            encrypt: false,
        }
    }

    /// Mark the value for encrypted storage.
    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }

    /// Restrict the answer to a fixed option list.
    ///
    /// Fails if `options` is empty.
    pub fn with_options<I>(mut self, options: I) -> Result<Self, ContractViolation>
    where
        I: IntoIterator<Item = InputOption>,
    {
        let options: Vec<InputOption> = options.into_iter().collect();
        if options.is_empty() {
            return Err(ContractViolation::EmptyOptions { name: self.name });
        }
        self.options = Some(options);
        Ok(self)
    }

    /// Resolve a 1-based ordinal selection to the option's stored value.
    ///
    /// Returns `None` for free-text inputs, non-numeric text and
    /// out-of-range ordinals alike.
    pub fn option_for(&self, selection: &str) -> Option<&InputOption> {
        let options = self.options.as_ref()?;
        let ordinal: usize = selection.trim().parse().ok()?;
        ordinal.checked_sub(1).and_then(|index| options.get(index))
    }
}
