use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::driver::{advance, QuestionProgress, Session};
use crate::screening::export::ProfileExport;
use crate::screening::profile::CandidateProfile;
use crate::screening::stage::Stage;
use crate::state::AppState;

pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Deserialize, Default)]
pub struct ExportQuery {
    #[serde(default)]
    pub anonymize: bool,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub stage: Stage,
    pub progress: u8,
    pub status: &'static str,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_progress: Option<QuestionProgress>,
}

impl TurnResponse {
    fn new(session: &Session, reply: String) -> Self {
        Self {
            session_id: session.id,
            stage: session.stage,
            progress: session.stage.progress(),
            status: session.stage.status_label(),
            reply,
            question_progress: session.question_progress(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub stage: Stage,
    pub progress: u8,
    pub status: &'static str,
    pub profile: CandidateProfile,
    pub tech_stack: Vec<String>,
    pub question_progress: Option<QuestionProgress>,
    pub summary: String,
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<TurnResponse>) {
    let session = state.sessions.create().await;
    let reply = session.greeting().to_string();
    (StatusCode::CREATED, Json(TurnResponse::new(&session, reply)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;
    let session = handle.lock().await;
    Ok(Json(SessionView {
        session_id: session.id,
        stage: session.stage,
        progress: session.stage.progress(),
        status: session.stage.status_label(),
        profile: session.profile.clone(),
        tech_stack: session.tech_stack.clone(),
        question_progress: session.question_progress(),
        summary: session.summary_report(Utc::now()),
    }))
}

/// POST /api/v1/sessions/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<TurnResponse>, AppError> {
    let Json(req) = payload?;
    if req.text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let handle = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;
    let mut session = handle.lock().await;
    let was_complete = session.stage.is_terminal();

    // Stored state changes in a single assignment after the turn resolves.
    let turn = advance(session.clone(), &req.text, &state.selector).await;
    *session = turn.session;

    if !was_complete && session.stage.is_terminal() {
        let export = ProfileExport::from_session(&session, Utc::now());
        if let Err(e) = state.profiles.save(&export).await {
            warn!("Failed to save profile for session {id}: {e}");
        }
    }

    Ok(Json(TurnResponse::new(&session, turn.reply)))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TurnResponse>, AppError> {
    let handle = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;
    let mut session = handle.lock().await;
    session.reset();
    info!("Session {id} reset");

    let reply = session.greeting().to_string();
    Ok(Json(TurnResponse::new(&session, reply)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

/// GET /api/v1/sessions/:id/export
pub async fn handle_export_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ExportQuery>,
) -> Result<Json<ProfileExport>, AppError> {
    let handle = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;
    let export = ProfileExport::from_session(&*handle.lock().await, Utc::now());
    Ok(Json(if params.anonymize {
        export.anonymize()
    } else {
        export
    }))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Json<Vec<ProfileExport>>, AppError> {
    let exports = state.profiles.list().await?;
    let exports = if params.anonymize {
        exports.into_iter().map(ProfileExport::anonymize).collect()
    } else {
        exports
    };
    Ok(Json(exports))
}
