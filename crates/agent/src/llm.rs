//! Fallback generator: a locally hosted language model behind `LlmClient`.
//!
//! This is the latency-dominant path. The rule engine and response cache in
//! front of it exist to keep traffic off it, so nothing here is consulted
//! until both have missed.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use munchy_core::config::LlmConfig;

/// Decoding parameters are fixed: bounded output, moderate temperature,
/// nucleus/top-k sampling, light repetition penalty, and stop sequences
/// marking the end of the agent's turn.
const MAX_OUTPUT_TOKENS: u32 = 150;
const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.95;
const TOP_K: u32 = 40;
const REPEAT_PENALTY: f64 = 1.1;
const STOP_SEQUENCES: &[&str] = &["User:", "\n\n"];

/// Instructional prompt embedding the raw user message. Session history is
/// tracked elsewhere but deliberately not threaded in here; prompting stays
/// context-free.
pub(crate) fn build_prompt(message: &str) -> String {
    format!(
        "<s>[INST] You are Munchy support for a food delivery service. Be brief and helpful.\n\nUser: {message}\n[/INST]"
    )
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generator backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("model `{model}` is not available on the backend")]
    ModelMissing { model: String },
    #[error("generator returned an empty completion")]
    EmptyCompletion,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Cheap readiness probe used by the startup check and health endpoint.
    async fn ensure_available(&self) -> Result<(), LlmError>;
}

pub struct OllamaClient {
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f64,
    top_p: f64,
    top_k: u32,
    repeat_penalty: f64,
    stop: Vec<&'static str>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_predict: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            repeat_penalty: REPEAT_PENALTY,
            stop: STOP_SEQUENCES.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            client,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key.expose_secret()),
            None => request,
        }
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions::default(),
        };
        let url = format!("{}/api/generate", self.base_url);

        let response = self.authorize(self.client.post(&url).json(&request)).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend { status, body });
        }

        let payload: GenerateResponse = response.json().await?;
        let completion = payload.response.trim().to_string();
        if completion.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(completion)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 0u32;
        loop {
            match self.generate_once(prompt).await {
                Ok(completion) => return Ok(completion),
                Err(error) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        event_name = "llm.generate.retry",
                        attempt,
                        error = %error,
                        "generator attempt failed, retrying"
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn ensure_available(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend { status, body });
        }

        let tags: TagsResponse = response.json().await?;
        let wanted = self.model.as_str();
        let present = tags.models.iter().any(|tag| {
            tag.name == wanted || tag.name.split(':').next() == wanted.split(':').next()
        });
        if !present {
            return Err(LlmError::ModelMissing { model: self.model.clone() });
        }
        Ok(())
    }
}
