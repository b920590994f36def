//! Chat completion for the adviser page.

use super::Service;
use crate::config::GroqConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use tracing::{debug, error};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub const SYSTEM_PROMPT: &str = "You are Fort-Flora AI Adviser, an expert EXCLUSIVELY on Maharashtra's historic forts \
and the biodiversity (flora & fauna) found around them.

STRICT RULES:
- ONLY answer questions related to Maharashtra: its forts, flora, fauna, heritage, trekking, culture, geography, and history.
- If a question is unrelated to Maharashtra, politely decline and redirect the user to ask about Maharashtra topics.
- Provide short, factual, educational responses (2-4 paragraphs max).
- Use bullet points when listing items.
- Mention specific fort names, districts, and species when relevant.

You can help with:
- Fort history, architecture, significance, and trekking tips
- Plants, trees, and medicinal herbs found near forts
- Best times to visit, nearby attractions, and safety advice
- Maharashtra's cultural and natural heritage
- Western Ghats biodiversity and conservation

Always answer in a friendly, knowledgeable tone. If you don't know, say so honestly.";

pub const NOT_CONFIGURED_REPLY: &str =
    "AI Adviser is not configured. Set GROQ_API_KEY in the environment or in fort-flora.toml.";
pub const APOLOGY_REPLY: &str = "Sorry, I encountered an error. Please try again later.";
pub const EMPTY_REPLY: &str = "No response received.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompletionError {
    #[snafu(display("completion request failed"))]
    Transport { source: reqwest::Error },

    #[snafu(display("completion service answered {status}: {body}"))]
    Status { status: u16, body: String },

    #[snafu(display("completion response was malformed"))]
    Decode { source: reqwest::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait Completion: Send + Sync {
    /// Reply to `message` given the earlier turns of the conversation.
    /// An empty string means the service answered without content.
    async fn complete(&self, prior: &[Turn], message: &str) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Turn>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Full message list: system prompt, prior turns, then the new message.
pub fn build_messages(prior: &[Turn], message: &str) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(prior.len() + 2);
    messages.push(Turn::system(SYSTEM_PROMPT));
    messages.extend(prior.iter().filter(|turn| turn.role != Role::System).cloned());
    messages.push(Turn::user(message));
    messages
}

pub struct GroqCompletion {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GroqCompletion {
    pub fn new(config: &GroqConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: GROQ_API_URL.to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl Completion for GroqCompletion {
    async fn complete(&self, prior: &[Turn], message: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: build_messages(prior, message),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        debug!(model = %self.model, turns = request.messages.len(), "requesting completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context(TransportSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await.context(DecodeSnafu)?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }
}

/// The adviser as pages see it: always answers with text.
#[derive(Clone)]
pub struct Adviser {
    service: Service<dyn Completion>,
}

impl Adviser {
    pub fn new(service: Service<dyn Completion>) -> Self {
        Self { service }
    }

    pub fn offline() -> Self {
        Self::new(Service::Absent)
    }

    pub fn with_completion(completion: Arc<dyn Completion>) -> Self {
        Self::new(Service::Configured(completion))
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_configured()
    }

    pub async fn ask(&self, prior: &[Turn], message: &str) -> String {
        let Some(completion) = self.service.get() else {
            return NOT_CONFIGURED_REPLY.to_string();
        };
        match completion.complete(prior, message).await {
            Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(reply) => reply,
            Err(err) => {
                error!(error = %err, "completion failed");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned replies and records what it was asked.
    struct Scripted {
        reply: Result<String, u16>,
        seen: Mutex<Vec<Vec<Turn>>>,
    }

    impl Scripted {
        fn new(reply: Result<&str, u16>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Completion for Scripted {
        async fn complete(&self, prior: &[Turn], message: &str) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(build_messages(prior, message));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(CompletionError::Status {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    #[test]
    fn test_messages_start_with_system_prompt_and_end_with_user() {
        let prior = vec![Turn::user("Raigad?"), Turn::assistant("A hill fort.")];
        let messages = build_messages(&prior, "And Sinhagad?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[3], Turn::user("And Sinhagad?"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: build_messages(&[], "hi"),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_adviser_fixed_replies() {
        assert_eq!(Adviser::offline().ask(&[], "hi").await, NOT_CONFIGURED_REPLY);

        let failing = Adviser::with_completion(Scripted::new(Err(500)));
        assert_eq!(failing.ask(&[], "hi").await, APOLOGY_REPLY);

        let silent = Adviser::with_completion(Scripted::new(Ok("  ")));
        assert_eq!(silent.ask(&[], "hi").await, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_adviser_sends_prior_turns() {
        let scripted = Scripted::new(Ok("Torna was first."));
        let adviser = Adviser::with_completion(Arc::clone(&scripted) as Arc<dyn Completion>);
        let prior = vec![Turn::user("first fort?"), Turn::assistant("Torna.")];

        assert_eq!(adviser.ask(&prior, "when?").await, "Torna was first.");
        let seen = scripted.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 4);
        assert_eq!(seen[0][1], prior[0]);
    }
}
