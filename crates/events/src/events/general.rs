use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Events not tied to a provisioning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Something the operator should notice; the pass continues
    Warning {
        message: String,
        context: Option<String>,
    },

    /// Only rendered with `--debug`
    DebugLog {
        message: String,
        context: HashMap<String, String>,
    },

    /// Which config file (or the built-in defaults) is in effect
    ConfigurationLoaded { source: String },
}

impl GeneralEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: None,
        }
    }

    pub fn warning_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
            context: HashMap::new(),
        }
    }
}
