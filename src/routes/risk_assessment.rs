use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::AppState;
use crate::error::{ApiError, Result};
use crate::models::risk::{RiskAssessmentRequest, RiskAssessmentResponse, SavedAssessment};
use crate::risk;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assess", post(assess_handler))
        .route("/factors", get(factors_handler))
        .route("/recommendations/:risk_factor", get(recommendations_handler))
        .route("/save-assessment", post(save_assessment_handler))
        .route("/assessments/:assessment_id", get(get_assessment_handler))
}

/// POST /assess
async fn assess_handler(
    Json(data): Json<RiskAssessmentRequest>,
) -> Result<Json<RiskAssessmentResponse>> {
    data.validate().map_err(ApiError::Validation)?;
    tracing::info!(
        "Processing risk assessment request for age: {}, gender: {}",
        data.age,
        data.gender
    );

    let result = risk::assess(&data);
    tracing::info!(
        "Risk assessment completed successfully, overall score: {}",
        result.overall_risk_score
    );
    Ok(Json(result))
}

/// GET /factors
async fn factors_handler() -> Json<Value> {
    Json(risk::assessable_factors())
}

/// GET /recommendations/:risk_factor
async fn recommendations_handler(Path(risk_factor): Path<String>) -> Result<Json<Value>> {
    let recommendations = risk::factor_recommendations(&risk_factor)
        .ok_or_else(|| ApiError::NotFound(format!("Risk factor '{}' not found", risk_factor)))?;

    Ok(Json(json!({
        "risk_factor": risk_factor,
        "recommendations": recommendations
    })))
}

/// POST /save-assessment
async fn save_assessment_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    if !body.is_object() {
        return Err(ApiError::Validation(
            "Assessment body must be a JSON object".to_string(),
        ));
    }

    let saved = state.assessments.save(body)?;
    Ok(Json(json!({
        "message": "Assessment saved successfully",
        "assessment_id": saved.assessment_id,
        "timestamp": saved.saved_at
    })))
}

/// GET /assessments/:assessment_id
async fn get_assessment_handler(
    State(state): State<AppState>,
    Path(assessment_id): Path<String>,
) -> Result<Json<SavedAssessment>> {
    state
        .assessments
        .get(&assessment_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Assessment '{}' not found", assessment_id)))
}
