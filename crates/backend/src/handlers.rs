use axum::{
    extract::{Json, Path, Query, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use shared_types::{
    CreateApplicationRequest, CreateJobRequest, DeleteResponse, EnrichedApplication, InsertAck,
    Job, JobApplication,
};

use crate::auth::{ensure_owner, types::AuthUser};
use crate::enrich::enrich_applications;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn root() -> &'static str {
    "Server is running...."
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.store.ping().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}

// Job handlers
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    let jobs = state.store.list_jobs().await?;
    Ok(Json(jobs))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state
        .store
        .get_job(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;

    Ok(Json(job))
}

pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> ApiResult<Json<InsertAck>> {
    let ack = state.store.insert_job(payload).await?;
    tracing::info!("Created job {}", ack.inserted_id);
    Ok(Json(ack))
}

// Application handlers
#[derive(Debug, Deserialize)]
pub struct ApplicantQuery {
    pub email: Option<String>,
}

/// List the caller's own applications, each overlaid with its job.
///
/// Runs behind `require_auth`; the ownership rule is checked before the store
/// is touched.
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ApplicantQuery>,
) -> ApiResult<Json<Vec<EnrichedApplication>>> {
    let email = query
        .email
        .ok_or_else(|| ApiError::bad_request("email query parameter is required"))?;

    ensure_owner(&user, &email)?;

    let applications = state.store.list_applications_by_email(&email).await?;
    let enriched =
        enrich_applications(state.store.as_ref(), applications, state.enrich_strategy).await;

    Ok(Json(enriched))
}

pub async fn list_applications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<JobApplication>>> {
    let applications = state.store.list_applications().await?;
    Ok(Json(applications))
}

pub async fn create_application(
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationRequest>,
) -> ApiResult<Json<InsertAck>> {
    let ack = state.store.insert_application(payload).await?;
    tracing::info!("Created application {}", ack.inserted_id);
    Ok(Json(ack))
}

pub async fn delete_application(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if job_id.trim().is_empty() {
        return Err(ApiError::bad_request("Job ID is required"));
    }

    let deleted_count = state.store.delete_application_by_job_id(&job_id).await?;
    if deleted_count == 0 {
        return Err(ApiError::not_found("Application"));
    }

    tracing::info!("Deleted application for job {}", job_id);
    Ok(Json(DeleteResponse {
        success: true,
        message: "Application deleted successfully".to_string(),
        deleted_count,
    }))
}

/// `DELETE /job-application/` with no id at all.
pub async fn delete_application_without_id() -> ApiError {
    ApiError::bad_request("Job ID is required")
}
