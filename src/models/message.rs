// ZDB-15: Conversation transcript entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A human-visible transcript entry. Machine-generated analysis prompts are
/// never stored as messages; they travel to the summarizer as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /api/v1/sessions/{id}/messages`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 8000, message = "Message must be between 1 and 8000 characters"))]
    pub content: String,
}
