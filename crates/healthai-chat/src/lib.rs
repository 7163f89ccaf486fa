//! healthai-chat
//!
//! Thin client for the hosted generative-language API backing the in-app
//! assistant. Callers always get a displayable string back: configuration and
//! transport problems are logged and turned into a message for the user.
use std::time::Duration;

use healthai_core::config::ChatSettings;
use healthai_core::error::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
pub const SAFETY_THRESHOLD: &str = "BLOCK_ONLY_HIGH";

pub struct GeminiChat {
    client: reqwest::Client,
    settings: ChatSettings,
    api_key: Option<String>,
}

impl GeminiChat {
    /// Build a client reading the key from the variable named by `api_key_env`.
    pub fn from_settings(settings: &ChatSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).ok().filter(|k| !k.trim().is_empty());
        Self::with_api_key(settings, api_key)
    }

    pub fn with_api_key(settings: &ChatSettings, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Operation(format!("http client: {e}")))?;
        Ok(Self { client, settings: settings.clone(), api_key })
    }

    pub fn is_configured(&self) -> bool { self.api_key.is_some() }

    /// One user message in, the assistant's full reply out.
    pub async fn reply(&self, message: &str) -> String {
        let Some(key) = self.api_key.as_deref() else {
            warn!(env = %self.settings.api_key_env, "chat requested without an API key");
            return format!("Error: the assistant is not configured ({} is not set).", self.settings.api_key_env);
        };
        match self.generate(key, message).await {
            Ok(text) => text,
            Err(e) => {
                error!("chat generation failed: {e}");
                format!("Sorry, I could not process your request: {e}")
            }
        }
    }

    async fn generate(&self, key: &str, message: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:streamGenerateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        );
        let body = request_body(&self.settings.system_instruction, message);
        debug!(model = %self.settings.model, chars = message.len(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Operation(format!("request failed: {}", e.without_url())))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Operation(format!("reading response: {}", e.without_url())))?;
        if !status.is_success() {
            return Err(Error::Operation(format!("service answered {status}")));
        }
        concat_stream_chunks(&text)
    }
}

/// JSON body for a single-turn request.
pub fn request_body(system_instruction: &str, message: &str) -> Value {
    let safety: Vec<Value> = HARM_CATEGORIES
        .iter()
        .map(|c| json!({ "category": c, "threshold": SAFETY_THRESHOLD }))
        .collect();
    json!({
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": message }] }],
        "safetySettings": safety,
        "generationConfig": { "responseMimeType": "text/plain" },
    })
}

#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Join the text of every streamed chunk. The body is a JSON array of chunks;
/// a lone chunk object is accepted too. Chunks without text contribute nothing.
pub fn concat_stream_chunks(body: &str) -> Result<String> {
    let chunks: Vec<Chunk> = match serde_json::from_str(body) {
        Ok(chunks) => chunks,
        Err(_) => vec![serde_json::from_str::<Chunk>(body)
            .map_err(|e| Error::Operation(format!("unexpected response: {e}")))?],
    };
    let mut out = String::new();
    for chunk in &chunks {
        let parts = chunk.candidates.first().and_then(|c| c.content.as_ref()).map(|c| c.parts.as_slice());
        for text in parts.unwrap_or_default().iter().filter_map(|p| p.text.as_deref()) {
            out.push_str(text);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_concatenated_in_order() {
        let body = r#"[
            {"candidates": [{"content": {"role": "model", "parts": [{"text": "Hello"}]}}]},
            {"candidates": [{"content": {"parts": [{"text": ", I am "}, {"text": "not a doctor."}]}}]},
            {"candidates": [{"finishReason": "STOP"}], "usageMetadata": {"totalTokenCount": 12}}
        ]"#;
        assert_eq!(concat_stream_chunks(body).unwrap(), "Hello, I am not a doctor.");
    }

    #[test]
    fn single_chunk_and_empty_stream() {
        let one = r#"{"candidates": [{"content": {"parts": [{"text": "Hi"}]}}]}"#;
        assert_eq!(concat_stream_chunks(one).unwrap(), "Hi");
        assert_eq!(concat_stream_chunks("[]").unwrap(), "");
        assert!(concat_stream_chunks("<html>").is_err());
    }

    #[test]
    fn body_carries_instruction_and_safety() {
        let body = request_body("be kind", "what is flu?");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be kind");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "what is flu?");
        assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
        let safety = body["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert!(safety.iter().all(|s| s["threshold"] == SAFETY_THRESHOLD));
    }

    #[tokio::test]
    async fn missing_key_is_explained() {
        let chat = GeminiChat::with_api_key(&ChatSettings::default(), None).unwrap();
        assert!(!chat.is_configured());
        let reply = chat.reply("hello").await;
        assert!(reply.contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_apology() {
        let settings = ChatSettings { endpoint: "http://127.0.0.1:9".to_string(), timeout_secs: 2, ..ChatSettings::default() };
        let chat = GeminiChat::with_api_key(&settings, Some("test-key".to_string())).unwrap();
        let reply = chat.reply("hello").await;
        assert!(reply.starts_with("Sorry"));
        assert!(!reply.contains("test-key"));
    }
}
