use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::server_config::cfg;
use crate::HttpClient;

const AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Send one prompt to the generative model and return the raw completion text.
///
/// Single attempt, no retry. The shared client carries the configured
/// timeout, so a hung provider surfaces here as an error rather than
/// blocking the handler indefinitely. Every failure mode — transport, auth,
/// quota, an error payload, a response with no candidates — is reported as
/// [`AppError::AiFailure`].
pub async fn generate(http_client: &HttpClient, prompt: &str) -> AppResult<String> {
    let url = format!("{}/{}:generateContent", AI_ENDPOINT, cfg.model.id);

    let resp = http_client
        .post(&url)
        .header("x-goog-api-key", &cfg.api.key)
        .json(&json!(
          {
            "contents": [
              { "parts": [{ "text": prompt }] }
            ],
            "generationConfig": { "temperature": cfg.model.temperature }
          }
        ))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    let parsed = serde_json::from_value::<GenerateApiResponseOrError>(resp.clone())
        .map_err(|e| AppError::AiFailure(anyhow!("could not parse model response: {e}: {resp}")))?;

    let parsed = match parsed {
        GenerateApiResponseOrError::Error(error) => {
            return Err(AppError::AiFailure(anyhow!(
                "model API error: {:?}",
                error.error
            )));
        }
        GenerateApiResponseOrError::Response(parsed) => parsed,
    };

    if let Some(usage) = &parsed.usage_metadata {
        tracing::debug!(
            prompt_tokens = usage.prompt_token_count,
            completion_tokens = usage.candidates_token_count,
            total_tokens = usage.total_token_count,
            "model token usage"
        );
    }

    let candidate = parsed
        .candidates
        .first()
        .ok_or_else(|| AppError::AiFailure(anyhow!("no candidates in model response")))?;

    let text = candidate
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(AppError::AiFailure(anyhow!(
            "empty completion, finish reason: {:?}",
            candidate.finish_reason
        )));
    }

    Ok(text)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateApiResponse {
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<i64>,
    pub candidates_token_count: Option<i64>,
    pub total_token_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: String,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateApiResponseOrError {
    Response(GenerateApiResponse),
    Error(GenerateApiError),
}
