use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppJsonResult, AppResult},
    extract,
    prompt::{self, gemini},
    tokenizer, HttpClient,
};

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub email_text: String,
}

/// `POST /classify`: extract text from the upload (or take it from the JSON
/// body), run it through the model, answer with the structured analysis.
pub async fn classify(
    State(http_client): State<HttpClient>,
    req: Request,
) -> AppJsonResult<prompt::EmailAnalysis> {
    let raw_text = read_request_text(req).await?;

    let email_text = raw_text.trim();
    if email_text.is_empty() {
        return Err(AppError::EmptyContent);
    }

    let prompt = prompt::classification_prompt(email_text);
    if let Some(count) = tokenizer::token_count(&prompt) {
        tracing::debug!(
            estimated_prompt_tokens = count,
            "sending classification prompt"
        );
    }

    let completion = gemini::generate(&http_client, &prompt).await?;
    let analysis = prompt::parse_analysis(&completion)?;

    tracing::info!(classification = %analysis.classification, "email classified");

    Ok(Json(analysis))
}

/// Pick the input source. A file part named `email_file` with a non-empty
/// filename wins; otherwise the JSON body's `email_text` is used. A request
/// that yields no text at all falls through to the empty-content rejection
/// in the handler.
async fn read_request_text(req: Request) -> AppResult<String> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read multipart body: {}", e)))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read multipart field: {}", e)))?
        {
            if field.name() != Some("email_file") {
                continue;
            }
            let file_name = field.file_name().unwrap_or_default().to_string();
            if file_name.is_empty() {
                continue;
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read file upload: {}", e)))?;

            return extract::read_text_from_file(&file_name, &bytes);
        }

        return Ok(String::new());
    }

    match Json::<ClassifyRequest>::from_request(req, &()).await {
        Ok(Json(body)) => Ok(body.email_text),
        // A body that is not JSON yields no text and gets the empty-content
        // rejection.
        Err(_) => Ok(String::new()),
    }
}
