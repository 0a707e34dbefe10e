use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access::{Principal, Role};
use super::domain::{ParameterSetId, ResumeId, ResumeSubmission, UserId};
use super::parameters::{ParameterSetDraft, ParameterSetPatch};
use super::repository::{CandidateRepository, ParameterSetRepository, RepositoryError};
use super::scoring::ScoreOutcome;
use super::service::{AtsService, AtsServiceError};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateScoreRequest {
    pub resume_id: String,
    pub parameter_id: String,
}

/// Wire shape returned by `POST /ats/calculate-score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreView {
    pub score: u8,
    pub details: ScoreDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreDetails {
    pub matched: u32,
    pub total: u32,
}

impl From<&ScoreOutcome> for ScoreView {
    fn from(outcome: &ScoreOutcome) -> Self {
        Self {
            score: outcome.score,
            details: ScoreDetails {
                matched: outcome.matched,
                total: outcome.total,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParametersQuery {
    #[serde(default)]
    pub active: Option<bool>,
}

/// Router builder exposing the ATS scoring and parameter-set endpoints.
pub fn ats_router<P, C>(service: Arc<AtsService<P, C>>) -> Router
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    Router::new()
        .route("/ats/calculate-score", post(calculate_score_handler::<P, C>))
        .route(
            "/ats/parameters",
            post(create_parameters_handler::<P, C>).get(list_parameters_handler::<P, C>),
        )
        .route(
            "/ats/parameters/:parameter_id",
            get(get_parameters_handler::<P, C>).patch(update_parameters_handler::<P, C>),
        )
        .route("/ats/resumes", post(submit_resume_handler::<P, C>))
        .route(
            "/ats/resumes/:resume_id",
            get(get_resume_handler::<P, C>).put(replace_resume_handler::<P, C>),
        )
        .with_state(service)
}

/// Principal asserted by the gateway through `x-user-id` / `x-user-role`.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(Role::parse);

    match (user_id, role) {
        (Some(user_id), Some(role)) => Ok(Principal {
            user_id: UserId(user_id.to_string()),
            role,
        }),
        _ => Err(error_body(
            StatusCode::UNAUTHORIZED,
            "missing or invalid caller identity",
        )),
    }
}

/// Every failure leaves the router as `{"error": ...}`, extractor rejections included.
fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) fn error_response(error: AtsServiceError) -> Response {
    let status = match &error {
        AtsServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        AtsServiceError::Unauthorized(_) => StatusCode::FORBIDDEN,
        AtsServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AtsServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AtsServiceError::Repository(_)
        | AtsServiceError::Scoring(_)
        | AtsServiceError::WriteContention { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "ats request failed");
    }

    error_body(status, error.to_string())
}

pub(crate) async fn calculate_score_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    payload: Result<axum::Json<CalculateScoreRequest>, JsonRejection>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    let resume_id = ResumeId(request.resume_id);
    let parameter_id = ParameterSetId(request.parameter_id);
    match service.calculate_score(&principal, &resume_id, &parameter_id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(ScoreView::from(&outcome))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_parameters_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    payload: Result<axum::Json<ParameterSetDraft>, JsonRejection>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    match service.create_parameter_set(&principal, draft) {
        Ok(parameters) => (StatusCode::CREATED, axum::Json(parameters)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_parameters_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    query: Result<Query<ListParametersQuery>, QueryRejection>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    match service.list_parameter_sets(&principal, query.active) {
        Ok(sets) => (StatusCode::OK, axum::Json(sets)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_parameters_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    Path(parameter_id): Path<String>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };

    match service.get_parameter_set(&principal, &ParameterSetId(parameter_id)) {
        Ok(parameters) => (StatusCode::OK, axum::Json(parameters)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_parameters_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    Path(parameter_id): Path<String>,
    payload: Result<axum::Json<ParameterSetPatch>, JsonRejection>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };
    let axum::Json(patch) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    match service.update_parameter_set(&principal, &ParameterSetId(parameter_id), patch) {
        Ok(parameters) => (StatusCode::OK, axum::Json(parameters)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_resume_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    payload: Result<axum::Json<ResumeSubmission>, JsonRejection>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };
    let axum::Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    match service.submit_resume(&principal, submission) {
        Ok(candidate) => (StatusCode::CREATED, axum::Json(candidate)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_resume_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    Path(resume_id): Path<String>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };

    match service.get_resume(&principal, &ResumeId(resume_id)) {
        Ok(candidate) => (StatusCode::OK, axum::Json(candidate)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_resume_handler<P, C>(
    State(service): State<Arc<AtsService<P, C>>>,
    headers: HeaderMap,
    Path(resume_id): Path<String>,
    payload: Result<axum::Json<ResumeSubmission>, JsonRejection>,
) -> Response
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };
    let axum::Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    match service.replace_resume(&principal, &ResumeId(resume_id), submission) {
        Ok(candidate) => (StatusCode::OK, axum::Json(candidate)).into_response(),
        Err(error) => error_response(error),
    }
}
