use std::time::Duration;

use async_trait::async_trait;
use lexi_config::ApiMode;
use lexi_config::ollama::OllamaConfig;
use serde::{Deserialize, Serialize};

use crate::{GenerateError, GenerationOptions, GenerationRequest, ProviderMetadata, TextGenerator};

#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api: ApiMode,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api: config.api,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.api.path())
    }

    /// Names of the models the server has pulled
    pub async fn list_models(&self) -> Result<Vec<String>, GenerateError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let response = check_status(response).await?;
        let tags: TagsReply = response
            .json()
            .await
            .map_err(|e| GenerateError::ApiError(format!("Failed to parse model list: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check that the server answers and the configured model is available
    pub async fn check_health(&self) -> Result<(), GenerateError> {
        let available = self.list_models().await?;

        if !model_available(&self.model, &available) {
            return Err(GenerateError::ModelNotFound {
                model: self.model.clone(),
                available,
            });
        }

        tracing::info!("Connected to Ollama at {} with model {}", self.base_url, self.model);
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let body = build_request_body(&self.model, self.api, request);

        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        tracing::debug!("Ollama response status: {}", response.status());

        let response = check_status(response).await?;
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerateError::ApiError(format!("Failed to parse response: {}", e)))?;

        parse_reply(self.api, &json)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "ollama".to_string(),
            model: self.model.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestBody<'a> {
    Generate {
        model: &'a str,
        prompt: &'a str,
        system: &'a str,
        stream: bool,
        options: GenerationOptions,
    },
    Chat {
        model: &'a str,
        messages: Vec<ChatMessage<'a>>,
        stream: bool,
        options: GenerationOptions,
    },
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// JSON body for a non-streaming call on `api`
pub fn build_request_body(model: &str, api: ApiMode, request: &GenerationRequest) -> serde_json::Value {
    let body = match api {
        ApiMode::Generate => RequestBody::Generate {
            model,
            prompt: &request.prompt,
            system: &request.system,
            stream: false,
            options: request.options,
        },
        ApiMode::Chat => RequestBody::Chat {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            stream: false,
            options: request.options,
        },
    };

    // Plain structs of strings and numbers always serialize
    serde_json::to_value(body).unwrap_or_default()
}

/// Reply text: `response` for generate, `message.content` for chat
pub fn parse_reply(api: ApiMode, json: &serde_json::Value) -> Result<String, GenerateError> {
    let text = match api {
        ApiMode::Generate => json["response"].as_str(),
        ApiMode::Chat => json["message"]["content"].as_str(),
    }
    .ok_or_else(|| GenerateError::ApiError("No reply text in response".to_string()))?;

    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }

    Ok(text.to_string())
}

/// `qwen3:latest` is available when any pulled model starts with `qwen3`
pub fn model_available(model: &str, available: &[String]) -> bool {
    let base = model.split(':').next().unwrap_or(model);
    available.iter().any(|name| name.starts_with(base))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GenerateError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest::new("be terse", "八?")
            .with_options(GenerationOptions::new(0.3).num_predict(15000))
    }

    #[test]
    fn test_generate_body() {
        let body = build_request_body("qwen3:latest", ApiMode::Generate, &request());
        assert_eq!(body["model"], "qwen3:latest");
        assert_eq!(body["prompt"], "八?");
        assert_eq!(body["system"], "be terse");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 15000);
        assert!(body["options"].get("top_p").is_none());
        assert!(body.get("messages").is_none());
    }

    #[test]
    fn test_chat_body() {
        let request = GenerationRequest::new("be terse", "八?")
            .with_options(GenerationOptions::new(0.3).top_p(0.9));
        let body = build_request_body("qwen3:latest", ApiMode::Chat, &request);
        assert_eq!(
            body["messages"],
            json!([
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "八?"}
            ])
        );
        assert!(body.get("prompt").is_none());
        assert!(body["options"].get("num_predict").is_none());
        assert!((body["options"]["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_parse_reply() {
        let generate = json!({"model": "qwen3", "response": "{\"a\": 1}", "done": true});
        assert_eq!(parse_reply(ApiMode::Generate, &generate).unwrap(), "{\"a\": 1}");

        let chat = json!({"message": {"role": "assistant", "content": "hi"}});
        assert_eq!(parse_reply(ApiMode::Chat, &chat).unwrap(), "hi");

        assert!(matches!(
            parse_reply(ApiMode::Chat, &generate),
            Err(GenerateError::ApiError(_))
        ));
        assert!(matches!(
            parse_reply(ApiMode::Generate, &json!({"response": "  "})),
            Err(GenerateError::EmptyResponse)
        ));
    }

    #[test]
    fn test_model_available() {
        let names = vec!["llama3:8b".to_string(), "qwen3:14b".to_string()];
        assert!(model_available("qwen3:latest", &names));
        assert!(model_available("llama3", &names));
        assert!(!model_available("mistral:7b", &names));
    }

    #[test]
    fn test_endpoint_per_mode() {
        let mut config = OllamaConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");

        config.api = ApiMode::Chat;
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_metadata_names_configured_model() {
        let config = OllamaConfig {
            model: "qwen3:8b".to_string(),
            ..Default::default()
        };
        let metadata = OllamaClient::new(&config).unwrap().metadata();
        assert_eq!(metadata.name, "ollama");
        assert_eq!(metadata.model, "qwen3:8b");
    }
}
