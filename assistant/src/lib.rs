//! # Assistant
//!
//! Chat-completion helpers around stored snippets: a short analysis of a
//! piece of code, and a generated snippet for a plain-language description.
//!
//! ```text
//! CodeAssistant ──► ChatRequest ──► ChatProvider (OpenAI /chat/completions)
//! ```

pub mod assistant;
pub mod chat;
pub mod error;

pub use assistant::{CodeAssistant, MIN_DESCRIPTION_CHARS};
pub use chat::{
    ChatMessage, ChatProvider, ChatRequest, DEFAULT_CHAT_MODEL, OpenAIChatClient, Role,
};
pub use error::{AssistantError, Result};
