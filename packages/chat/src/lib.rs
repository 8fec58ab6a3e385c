#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Placeholder chat assistant.
//!
//! No model is called yet. The assistant checks that an `OpenAI` key is
//! configured and echoes the question back, so the frontend chat panel can
//! be wired end to end.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// What kind of answer the assistant produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChatReplyKind {
    /// No API key is configured.
    MissingCredential,
    /// The question was blank.
    EmptyQuery,
    /// The question was echoed back.
    Echo,
}

/// A chat answer shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Reply kind.
    pub kind: ChatReplyKind,
    /// User-visible text.
    pub text: String,
}

/// Answers sidebar chat messages.
#[derive(Debug, Clone, Default)]
pub struct ChatAssistant {
    api_key: Option<String>,
}

impl ChatAssistant {
    /// Creates an assistant with an explicit key. Blank keys count as
    /// missing.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Creates an assistant with the key from [`API_KEY_VAR`].
    #[must_use]
    pub fn from_env() -> Self {
        let assistant = Self::new(std::env::var(API_KEY_VAR).ok());
        if !assistant.has_credential() {
            log::info!("{API_KEY_VAR} not set, chat replies will ask for a key");
        }
        assistant
    }

    /// Returns `true` if an API key is configured.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Answers `input`. Never fails: every problem becomes a user-visible
    /// reply.
    #[must_use]
    pub fn respond(&self, input: &str) -> ChatReply {
        let question = input.trim();
        if question.is_empty() {
            return ChatReply {
                kind: ChatReplyKind::EmptyQuery,
                text: "Ask a question about cultural sites to get started.".to_string(),
            };
        }
        if !self.has_credential() {
            return ChatReply {
                kind: ChatReplyKind::MissingCredential,
                text: format!(
                    "Please set the {API_KEY_VAR} environment variable to use the chatbot."
                ),
            };
        }
        log::debug!("Chat question: {question}");
        ChatReply {
            kind: ChatReplyKind::Echo,
            text: format!("You asked about: {question}"),
        }
    }
}
