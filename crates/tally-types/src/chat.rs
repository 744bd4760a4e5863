//! Conversation memory types: chat turns and rolling summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Number of turns included in the prompt window by default.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Stored turn count above which history is compressed into the summary.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 50;

/// Speaker of a chat turn.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// One message in a user's conversation with the assistant.
///
/// Turns are immutable once written. `seq` is assigned by the store and
/// strictly increases with insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub seq: i64,
    pub user_id: UserId,
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// Render as a `role: content` transcript line.
    pub fn line(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}

/// The compressed long-term memory for a user. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub user_id: UserId,
    pub summary: String,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /ai/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Response body for `POST /ai/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// `{success, msg}` body shared by the reset and voice endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub msg: String,
}

impl Outcome {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            msg: msg.into(),
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: msg.into(),
        }
    }
}
