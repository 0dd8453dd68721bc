use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Local};
use ledger::RegisterError;
use model::{attendee::AttendeeInput, session::Session, trainer::TrainerInput};
use serde_json::json;

use crate::context::{internal_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/estado", get(status))
        .route("/api/registrar", post(register_attendee))
        .route("/api/capacitador/registrar", post(register_trainer))
}

/// Whether the sign-in form is open right now, with the reason and the event
/// the form would register against.
async fn status(State(state): State<AppState>) -> Response {
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    match state.ledger.events.status(&mut session, Local::now()).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn register_attendee(
    State(state): State<AppState>,
    Json(input): Json<AttendeeInput>,
) -> Response {
    let now = Local::now();
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    let event = match state.ledger.events.resolve_active(&mut session, now).await {
        Ok(Some(event)) => event,
        Ok(None) => return closed(&state, &mut session, now).await,
        Err(err) => return internal_error(err),
    };

    match state
        .ledger
        .registration
        .register_attendee(&mut session, event.id, input, now)
        .await
    {
        Ok(attendee) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Registration recorded", "id": attendee.id })),
        )
            .into_response(),
        Err(err) => register_error(err),
    }
}

async fn register_trainer(
    State(state): State<AppState>,
    Json(input): Json<TrainerInput>,
) -> Response {
    let now = Local::now();
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    let event = match state.ledger.events.resolve_active(&mut session, now).await {
        Ok(Some(event)) => event,
        Ok(None) => return closed(&state, &mut session, now).await,
        Err(err) => return internal_error(err),
    };

    match state
        .ledger
        .registration
        .register_trainer(&mut session, event.id, input, now)
        .await
    {
        Ok(trainer) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Trainer recorded", "id": trainer.id })),
        )
            .into_response(),
        Err(err) => register_error(err),
    }
}

/// No event is open; answer 403 with the same reason `/api/estado` gives.
async fn closed(state: &AppState, session: &mut Session, now: DateTime<Local>) -> Response {
    match state.ledger.events.status(session, now).await {
        Ok(status) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": status.reason })),
        )
            .into_response(),
        Err(err) => internal_error(err),
    }
}

fn register_error(err: RegisterError) -> Response {
    let code = match err {
        RegisterError::EventNotFound => StatusCode::NOT_FOUND,
        RegisterError::NotOpen(_) => StatusCode::FORBIDDEN,
        RegisterError::MissingField(_) => StatusCode::BAD_REQUEST,
        RegisterError::AlreadyRegistered | RegisterError::TrainerAlreadyRegistered => {
            StatusCode::CONFLICT
        }
        RegisterError::Common(err) => return internal_error(err),
    };
    (code, Json(json!({ "error": err.to_string() }))).into_response()
}
