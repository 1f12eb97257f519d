use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

/// A rendered notification. The message text is its identity; only `seen` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub priority: AlertPriority,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub seen: bool,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        priority: AlertPriority,
        message: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            priority,
            timestamp,
            seen: false,
        }
    }
}
