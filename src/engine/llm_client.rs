use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::engine::prompt_builder;
use crate::error::{ModelError, ValidationError};
use crate::model::catalog::SessionParameters;
use crate::model::message::Message;
use crate::model::player_state::PlayerState;

/// Everything the model collaborator sees for one turn: the frozen session
/// parameters, the current state snapshot, the transcript, and the input.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub parameters: &'a SessionParameters,
    pub state: &'a PlayerState,
    pub history: &'a [Message],
    pub player_input: &'a str,
}

/// The external model collaborator. The engine only consumes the returned
/// payload text; prompt formatting and transport live behind this trait.
#[cfg_attr(test, mockall::automock)]
pub trait ModelClient {
    /// Asks the model for the next structured game-state update.
    fn invoke<'a>(&self, ctx: &TurnContext<'a>) -> Result<String, ModelError>;

    /// Asks the model to re-derive a payload that failed validation, with
    /// the full error list appended as feedback.
    fn repair_request<'a>(
        &self,
        ctx: &TurnContext<'a>,
        raw: &str,
        errors: &ValidationError,
    ) -> Result<String, ModelError>;
}

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
}

/// Model collaborator backed by an OpenAI-style `/v1/chat/completions`
/// endpoint (LM Studio, llama.cpp server, ...). The request timeout bounds
/// every call; a timeout surfaces as `ModelError::Transport`.
pub struct LmStudioClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl LmStudioClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn chat(&self, prompt: String) -> Result<String, ModelError> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "system".into(),
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&req)
            .send()?
            .error_for_status()?
            .json::<ChatCompletionResponse>()?;

        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Malformed("completion carried no choices".into()))?;
        Ok(choice.message.content)
    }

    /// Probes the endpoint's model listing, mostly for startup diagnostics.
    pub fn test_connection(&self) -> Result<String> {
        let resp: serde_json::Value = self
            .http
            .get(format!("{}/v1/models", self.base_url))
            .send()?
            .json()?;

        Ok(format!(
            "Connected ({} models available)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl ModelClient for LmStudioClient {
    fn invoke(&self, ctx: &TurnContext<'_>) -> Result<String, ModelError> {
        self.chat(prompt_builder::build_turn_prompt(ctx))
    }

    fn repair_request(
        &self,
        ctx: &TurnContext<'_>,
        raw: &str,
        errors: &ValidationError,
    ) -> Result<String, ModelError> {
        self.chat(prompt_builder::build_repair_prompt(ctx, raw, errors))
    }
}
