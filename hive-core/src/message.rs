//! Broadcast message type carried from producers to live subscribers.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// Content of the synthetic liveness message.
pub const HEARTBEAT_CONTENT: &str = "heartbeat";

/// A state-change notification.
///
/// `keys` lists the affected item keys (for example the ids of monitored
/// sockets whose health flipped). Heartbeats carry no keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(default)]
    pub keys: Vec<String>,
    pub timestamp: Timestamp,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(content: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            content: content.into(),
            keys,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create a heartbeat message.
    pub fn heartbeat() -> Self {
        Self::new(HEARTBEAT_CONTENT, Vec::new())
    }

    pub fn is_heartbeat(&self) -> bool {
        self.keys.is_empty() && self.content == HEARTBEAT_CONTENT
    }

    /// SSE event name for this message.
    pub fn event_name(&self) -> &'static str {
        if self.is_heartbeat() {
            "heartbeat"
        } else {
            "message"
        }
    }
}
