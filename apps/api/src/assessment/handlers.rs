use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::catalog::{Question, QuestionType, Step, MAX_RESPONSE, MIN_RESPONSE};
use crate::assessment::engine::{AdvanceOutcome, SessionView};
use crate::assessment::models::AssessmentResult;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StepQuestions {
    pub step: Step,
    pub index: usize,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub scale: &'static str,
    pub min: i64,
    pub max: i64,
    pub questions: Vec<Question>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    pub value: i64,
}

fn step_questions(state: &AppState, step: Step) -> StepQuestions {
    StepQuestions {
        step,
        index: step.index(),
        title: step.title(),
        question_type: step.question_type(),
        scale: step.question_type().scale_label(),
        min: MIN_RESPONSE,
        max: MAX_RESPONSE,
        questions: state.engine.catalog().for_step(step).copied().collect(),
    }
}

/// GET /api/v1/assessment/questions
pub async fn handle_list_questions(State(state): State<AppState>) -> Json<Vec<StepQuestions>> {
    Json(
        Step::ALL
            .into_iter()
            .map(|step| step_questions(&state, step))
            .collect(),
    )
}

/// GET /api/v1/assessment/questions/:step
pub async fn handle_step_questions(
    State(state): State<AppState>,
    step: Result<Path<Step>, PathRejection>,
) -> Result<Json<StepQuestions>, AppError> {
    let Path(step) = step?;
    Ok(Json(step_questions(&state, step)))
}

/// POST /api/v1/assessment/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(state.engine.create_session().await))
}

/// GET /api/v1/assessment/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.session(id).await?))
}

/// PUT /api/v1/assessment/sessions/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let view = state
        .engine
        .submit_answer(id, &req.question_id, req.value)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/assessment/sessions/:id/advance
///
/// On the final step this submits the assessment and waits for the result.
pub async fn handle_advance(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AdvanceOutcome>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.advance(id).await?))
}

/// POST /api/v1/assessment/sessions/:id/back
pub async fn handle_back(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.back(id).await?))
}

/// POST /api/v1/assessment/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.reset(id).await?))
}

/// GET /api/v1/assessment/sessions/:id/result
pub async fn handle_get_result(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AssessmentResult>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.result(id).await?))
}
