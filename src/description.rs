//! Prompt construction and the multimodal chat call.

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::error::{PipelineError, PipelineResult};

const PROMPT_HEADER: &str =
    "You are analyzing an astronomical image.\n\nKnown celestial objects:\n";
const PROMPT_FOOTER: &str =
    "\n\nDescribe the image and relate visible structures to the listed objects.";

pub trait ChatService: Send + Sync {
    /// Send one user message made of `prompt` and an image data URL and
    /// return the first choice's text.
    fn complete(&self, prompt: &str, image_data_url: &str) -> PipelineResult<String>;
}

/// `["NGC 7317 Galaxy", "HCG 92 Compact Group of Galaxies"]`, or `[]`.
pub fn render_object_list(objects: &[String]) -> String {
    let quoted: Vec<String> = objects.iter().map(|o| format!("{:?}", o)).collect();
    format!("[{}]", quoted.join(", "))
}

pub fn build_prompt(objects: &[String]) -> String {
    format!(
        "{}{}{}",
        PROMPT_HEADER,
        render_object_list(objects),
        PROMPT_FOOTER
    )
}

pub fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Ask the chat service to describe the annotated image in light of `objects`.
pub fn describe_image(
    chat: &dyn ChatService,
    objects: &[String],
    annotated_image: &Path,
) -> PipelineResult<String> {
    let bytes = std::fs::read(annotated_image)?;
    let prompt = build_prompt(objects);
    debug!("Description prompt: {}", prompt);

    let description = chat.complete(&prompt, &png_data_url(&bytes))?;
    info!("Received description ({} chars)", description.len());
    Ok(description)
}

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    n: u32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat completion client for any OpenAI-compatible endpoint (Groq by default).
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    model_name: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("endpoint", &self.endpoint)
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

impl OpenAiChat {
    pub fn new(config: &ChatConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        info!(
            "Chat client configured: endpoint={}, model={}",
            endpoint, config.model
        );

        Ok(Self {
            client,
            endpoint,
            model_name: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn request_body(&self, prompt: &str, image_data_url: &str) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": prompt},
                    {"type": "image_url", "image_url": {"url": image_data_url}}
                ]),
            }],
            n: 1,
        }
    }
}

fn first_choice_text(response: ChatResponse) -> PipelineResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| PipelineError::Description("response contained no choices".to_string()))
}

impl ChatService for OpenAiChat {
    fn complete(&self, prompt: &str, image_data_url: &str) -> PipelineResult<String> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&self.request_body(prompt, image_data_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| PipelineError::Description(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::Description(format!(
                "chat service returned {}: {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .map_err(|e| PipelineError::Description(format!("malformed response: {}", e)))?;
        first_choice_text(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ChatService for Recorder {
        fn complete(&self, prompt: &str, image_data_url: &str) -> PipelineResult<String> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), image_data_url.to_string()));
            Ok("A compact group of galaxies.".to_string())
        }
    }

    #[test]
    fn test_render_object_list() {
        assert_eq!(render_object_list(&[]), "[]");
        assert_eq!(
            render_object_list(&["NGC 7317 Galaxy".to_string(), "HCG 92 Quasar".to_string()]),
            r#"["NGC 7317 Galaxy", "HCG 92 Quasar"]"#
        );
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt(&["NGC 7317 Galaxy".to_string()]);
        assert_eq!(
            prompt,
            "You are analyzing an astronomical image.\n\n\
             Known celestial objects:\n\
             [\"NGC 7317 Galaxy\"]\n\n\
             Describe the image and relate visible structures to the listed objects."
        );
    }

    #[test]
    fn test_data_url() {
        assert_eq!(png_data_url(b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_describe_image_sends_prompt_and_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labeled.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let chat = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let text = describe_image(&chat, &[], &path).unwrap();
        assert_eq!(text, "A compact group of galaxies.");

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("Known celestial objects:\n[]\n"));
        assert_eq!(seen[0].1, png_data_url(b"png-bytes"));
    }

    #[test]
    fn test_describe_missing_image_is_io_error() {
        let chat = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let err = describe_image(&chat, &[], Path::new("/nope/labeled.png")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
        assert!(chat.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_request_format() {
        let chat = OpenAiChat::new(&ChatConfig::default()).unwrap();
        let body = chat.request_body("hi", "data:image/png;base64,AA");
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["model"], "meta-llama/llama-4-scout-17b-16e-instruct");
        assert_eq!(json["n"], 1);
        let content = &json["messages"][0]["content"];
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "hi");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AA");
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let chat = OpenAiChat::new(&ChatConfig {
            endpoint: "http://localhost:8081/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(chat.endpoint, "http://localhost:8081/v1");
        assert_eq!(chat.model_name(), "meta-llama/llama-4-scout-17b-16e-instruct");
    }

    #[test]
    fn test_response_parsing() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "First."}},
                {"message": {"role": "assistant", "content": "Second."}}
            ]
        }))
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "First.");

        let empty: ChatResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            first_choice_text(empty).unwrap_err(),
            PipelineError::Description(_)
        ));
    }

    #[test]
    fn test_unreachable_endpoint_fails() {
        let chat = OpenAiChat::new(&ChatConfig {
            endpoint: "http://127.0.0.1:59999".to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        let err = chat.complete("hi", "data:,").unwrap_err();
        assert!(matches!(err, PipelineError::Description(_)));
    }
}
