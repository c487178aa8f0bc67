//! Global configuration types for ussdflow.
//!
//! `GlobalConfig` represents the top-level `config.toml`. Every field has a
//! default so an empty (or missing) file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.ussdflow/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for the screen/session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Prefix for every store key written by the state machine.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Namespace of the hash holding collected input values.
    #[serde(default = "default_input_namespace")]
    pub input_namespace: String,

    /// Namespace of the hash holding screen, cursor and salt.
    #[serde(default = "default_meta_namespace")]
    pub meta_namespace: String,

    /// Maximum consecutive `Goto` transitions followed for one message.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Optional line shown above a re-rendered prompt after a bad selection.
    #[serde(default)]
    pub invalid_selection_notice: Option<String>,

    /// Serialize concurrent requests for the same session within this process.
    #[serde(default = "default_serialize_sessions")]
    pub serialize_sessions: bool,

    /// Text returned to the user when a request fails upstream of them.
    #[serde(default = "default_service_unavailable_text")]
    pub service_unavailable_text: String,
}

fn default_key_prefix() -> String {
    "ussd:".to_string()
}

fn default_input_namespace() -> String {
    "InputData".to_string()
}

fn default_meta_namespace() -> String {
    "Session".to_string()
}

fn default_max_redirects() -> usize {
    8
}

fn default_serialize_sessions() -> bool {
    true
}

fn default_service_unavailable_text() -> String {
    "Service temporarily unavailable. Please try again later.".to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            input_namespace: default_input_namespace(),
            meta_namespace: default_meta_namespace(),
            max_redirects: default_max_redirects(),
            invalid_selection_notice: None,
            serialize_sessions: default_serialize_sessions(),
            service_unavailable_text: default_service_unavailable_text(),
        }
    }
}

/// Settings for the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
