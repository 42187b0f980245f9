//! Language-model oracle served by an Ollama-compatible `/api/generate` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{parse_reply, render_prompt, Decision, DecisionRequest, Oracle, OracleError};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaOracle {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaOracle {
    pub fn new(base_url: &str, model: &str) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Oracle for OllamaOracle {
    async fn propose(&self, request: &DecisionRequest) -> Result<Decision, OracleError> {
        let prompt = render_prompt(request);
        tracing::debug!(
            player = %request.player,
            model = %self.model,
            prompt_len = prompt.len(),
            "requesting decision"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest {
                model: &self.model,
                prompt: &prompt,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Unreachable(format!("HTTP {status}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| OracleError::Malformed(format!("unexpected response body: {err}")))?;
        parse_reply(&body.response)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
