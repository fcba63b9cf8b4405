//! AI assistant: weekly summary and data-grounded chat
//!
//! Text generation sits behind [`TextGenerator`] so the prompt logic can be
//! exercised without a network. [`GeminiClient`] is the production
//! implementation.

pub mod chat;
pub mod gemini;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use chat::{score_records, ChatHistory, CHAT_DATA_ROWS};
pub use gemini::{GeminiClient, GEMINI_BASE_URL};
pub use summary::{summarize, ScoreStats, NO_DATA_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One message of a conversation. Hidden turns are sent but never displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            hidden: false,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Turns a conversation into the next model reply.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String>;
}

/// How a failed generation is shown to the user.
pub(crate) fn inline_error(err: &crate::ScoreError) -> String {
    format!("❌ Lỗi khi gọi trợ lý AI: {}", err)
}
