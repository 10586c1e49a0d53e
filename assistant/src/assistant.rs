//! Code analysis and snippet suggestions on top of a [`ChatProvider`].

use std::sync::Arc;

use tracing::debug;

use crate::chat::{ChatMessage, ChatProvider, ChatRequest};
use crate::error::{AssistantError, Result};

/// Shortest description `suggest_snippet` accepts, in characters.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

const ANALYSIS_TEMPERATURE: f64 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 300;
const SUGGESTION_TEMPERATURE: f64 = 0.7;
const SUGGESTION_MAX_TOKENS: u32 = 500;

/// Asks a chat model about code.
pub struct CodeAssistant {
    provider: Arc<dyn ChatProvider>,
}

impl CodeAssistant {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Get the chat provider.
    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    /// Explain `code`, rate its complexity and point out one improvement and
    /// any likely bugs.
    pub async fn analyze_code(&self, code: &str, language: &str) -> Result<String> {
        if code.trim().is_empty() {
            return Err(AssistantError::EmptyCode);
        }
        debug!("Analyzing {} chars of {language}", code.len());
        self.provider
            .complete(&analysis_request(code, language))
            .await
    }

    /// Generate a commented `language` snippet matching `description`.
    pub async fn suggest_snippet(&self, description: &str, language: &str) -> Result<String> {
        let actual = description.trim().chars().count();
        if actual < MIN_DESCRIPTION_CHARS {
            return Err(AssistantError::DescriptionTooShort {
                min: MIN_DESCRIPTION_CHARS,
                actual,
            });
        }
        debug!("Suggesting a {language} snippet");
        self.provider
            .complete(&suggestion_request(description, language))
            .await
    }
}

fn analysis_request(code: &str, language: &str) -> ChatRequest {
    let system = format!(
        "You are a code analysis expert. Analyze the provided {language} code and provide:\n\
         1. A brief explanation of what it does (2-3 sentences)\n\
         2. Complexity assessment (Simple/Medium/Complex)\n\
         3. One specific improvement suggestion\n\
         4. Any potential issues or bugs\n\
         \n\
         Keep your response concise and practical."
    );
    ChatRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(code)],
        temperature: ANALYSIS_TEMPERATURE,
        max_tokens: ANALYSIS_MAX_TOKENS,
    }
}

fn suggestion_request(description: &str, language: &str) -> ChatRequest {
    let system = format!(
        "You are a helpful coding assistant. Generate a practical {language} code snippet \
         based on the user's description.\n\
         Provide ONLY the code, no explanations or markdown. Make it production-ready and \
         include comments."
    );
    ChatRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(description)],
        temperature: SUGGESTION_TEMPERATURE,
        max_tokens: SUGGESTION_MAX_TOKENS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records requests and answers with a fixed text.
    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl Recording {
        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recording-1"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("ok".to_string())
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn assistant() -> (CodeAssistant, Arc<Recording>) {
        let provider = Arc::new(Recording::default());
        (CodeAssistant::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_analyze_sends_code_as_user_message() {
        let (assistant, provider) = assistant();

        let analysis = assistant
            .analyze_code("def add(a, b): return a + b", "python")
            .await
            .unwrap();

        assert_eq!(analysis, "ok");
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(
            request.messages[0]
                .content
                .starts_with("You are a code analysis expert. Analyze the provided python code")
        );
        assert!(
            request.messages[0]
                .content
                .contains("Complexity assessment (Simple/Medium/Complex)")
        );
        assert_eq!(
            request.messages[1],
            ChatMessage::user("def add(a, b): return a + b")
        );
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_code() {
        let (assistant, provider) = assistant();

        let err = assistant.analyze_code(" \n\t", "rust").await.unwrap_err();

        assert!(matches!(err, AssistantError::EmptyCode));
        assert!(err.is_validation_error());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_uses_generation_settings() {
        let (assistant, provider) = assistant();

        assistant
            .suggest_snippet("debounce a search box", "typescript")
            .await
            .unwrap();

        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 500);
        assert!(
            request.messages[0]
                .content
                .contains("Generate a practical typescript code snippet")
        );
        assert!(request.messages[0].content.contains("Provide ONLY the code"));
        assert_eq!(request.messages[1], ChatMessage::user("debounce a search box"));
    }

    #[tokio::test]
    async fn test_suggest_requires_ten_characters() {
        let (assistant, provider) = assistant();

        let err = assistant
            .suggest_snippet("  sort it  ", "rust")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssistantError::DescriptionTooShort { min: 10, actual: 7 }
        ));
        assert!(provider.requests().is_empty());

        // Nine characters, ten bytes.
        let err = assistant.suggest_snippet("trié vite", "rust").await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::DescriptionTooShort { actual: 9, .. }
        ));

        assistant.suggest_snippet("tri à bulle", "rust").await.unwrap();
        assert_eq!(provider.requests().len(), 1);
    }
}
