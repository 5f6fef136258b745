use axum::{extract::State, routing::post, Json, Router};
use std::time::Instant;

use super::AppState;
use crate::error::{ApiError, Result};
use crate::models::symptom::{SymptomRequest, SymptomResponse};
use crate::symptom;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/test", post(test_handler))
}

/// POST /analyze - Ask the completion model about the reported symptoms
async fn analyze_handler(
    State(state): State<AppState>,
    Json(data): Json<SymptomRequest>,
) -> Result<Json<SymptomResponse>> {
    let start = Instant::now();

    if !state.openai.is_configured() {
        return Err(ApiError::OpenAiNotConfigured);
    }

    let request = symptom::build_request(&state.config.openai_model, &data);
    let completion = match state.openai.chat_completion(&request).await {
        Ok(completion) => completion,
        Err(e) => {
            tracing::error!("OpenAI API error: {}", e);
            state.metrics.record_openai_call(false, 0, 0);
            return Err(e);
        }
    };

    let (prompt_tokens, completion_tokens) = completion
        .usage
        .as_ref()
        .map(|u| (u.prompt_tokens.max(0) as u64, u.completion_tokens.max(0) as u64))
        .unwrap_or((0, 0));
    state
        .metrics
        .record_openai_call(true, prompt_tokens, completion_tokens);

    let result = symptom::parse_completion_content(completion.first_content());

    tracing::info!(
        "Symptom check performed: Age group: {}, Gender: {}",
        symptom::age_group(data.age),
        data.gender
    );
    tracing::info!(
        "API Request: /symptom-checker/analyze, Status: 200, Processing Time: {:.4}s",
        start.elapsed().as_secs_f64()
    );

    Ok(Json(result))
}

/// POST /test - Canned answer, no upstream call
async fn test_handler(Json(_data): Json<SymptomRequest>) -> Json<SymptomResponse> {
    Json(symptom::canned_response())
}
