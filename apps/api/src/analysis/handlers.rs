//! Axum route handlers for the analysis API.
//!
//! Every task handler validates its input, probes the model server, runs one gateway
//! call and parses the reply as JSON. The reply's shape is not checked.

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::InferenceGateway;
use crate::errors::AppError;
use crate::json_body::JsonBody;
use crate::llm_client::strip_json_fences;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body shared by all analysis endpoints. Missing fields deserialize as `None` so the
/// handler, not the extractor, decides what is required. Decoded by `JsonBody`, which
/// ignores `Content-Type`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub resume: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub connected: bool,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/ollama/connection
///
/// Advisory probe. Never fails: an unreachable server reports `connected: false`.
pub async fn handle_connection(State(state): State<AppState>) -> Json<ConnectionResponse> {
    let connected = state.gateway.check_connection().await;
    if !connected {
        warn!("Ollama is not reachable");
        return Json(ConnectionResponse {
            connected,
            models: Vec::new(),
            error: Some("Failed to connect to Ollama".to_string()),
        });
    }

    let models = state.gateway.list_models().await;
    Json(ConnectionResponse {
        connected,
        models,
        error: None,
    })
}

/// POST /api/resume/grade
///
/// Grades a resume, optionally against a job description. The parsed grading result is
/// returned with a server-assigned `gradedAt` timestamp.
pub async fn handle_grade(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    let resume = required(&request.resume, "Resume content is required")?;

    ensure_connected(&state.gateway).await?;

    let raw = state
        .gateway
        .grade_resume(resume, request.job_description.as_deref())
        .await?;

    let mut result = parse_model_object(&raw)?;
    result.insert(
        "gradedAt".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    info!("Resume graded");
    Ok(Json(Value::Object(result)))
}

/// POST /api/resume/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    let (resume, job_description) = require_both(&request)?;

    ensure_connected(&state.gateway).await?;

    let raw = state
        .gateway
        .optimize_resume(resume, job_description)
        .await?;

    Ok(Json(parse_model_output(&raw)?))
}

/// POST /api/job/parse
pub async fn handle_parse_job(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    let job_description = required(&request.job_description, "Job description is required")?;

    ensure_connected(&state.gateway).await?;

    let raw = state.gateway.parse_job_description(job_description).await?;

    Ok(Json(parse_model_output(&raw)?))
}

/// POST /api/resume/match
pub async fn handle_match(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    let (resume, job_description) = require_both(&request)?;

    ensure_connected(&state.gateway).await?;

    let raw = state
        .gateway
        .match_resume_to_job(resume, job_description)
        .await?;

    Ok(Json(parse_model_output(&raw)?))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn required<'a>(field: &'a Option<String>, message: &str) -> Result<&'a str, AppError> {
    match field.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

fn require_both(request: &AnalysisRequest) -> Result<(&str, &str), AppError> {
    const MESSAGE: &str = "Resume and job description are required";
    Ok((
        required(&request.resume, MESSAGE)?,
        required(&request.job_description, MESSAGE)?,
    ))
}

/// Generation is never attempted against a server that fails the probe.
async fn ensure_connected(gateway: &InferenceGateway) -> Result<(), AppError> {
    if gateway.check_connection().await {
        Ok(())
    } else {
        Err(AppError::ServiceUnavailable)
    }
}

fn parse_model_output(raw: &str) -> Result<Value, AppError> {
    serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AppError::MalformedModelOutput(e.to_string()))
}

fn parse_model_object(raw: &str) -> Result<serde_json::Map<String, Value>, AppError> {
    match parse_model_output(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::MalformedModelOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
