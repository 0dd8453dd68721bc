use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use chrono::{Local, NaiveDate};
use ledger::ReportError;
use model::event::EventDraft;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;
use storage::attendee::AttendeeFilter;

use crate::context::{self, internal_error, unauthorized, AdminContext, AppState, AUTH_COOKIE};

pub fn routes(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/verificar-sesion", get(verify_session))
        .route("/logout", post(logout))
        .route("/configuracion", get(list_events).post(create_event))
        .route("/configuracion/:id/activar", post(toggle_event))
        .route("/asistentes", get(list_attendees))
        .route("/dashboard", get(dashboard))
        .route("/generar-pdf", get(generate_pdf))
        .layer(middleware::from_fn_with_state(
            state,
            context::require_admin,
        ));

    Router::new().route("/login", post(login)).merge(guarded)
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Response {
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    match state
        .ledger
        .auth
        .login(&mut session, &form.username, &form.password)
        .await
    {
        Ok(Some(key)) => {
            let cookie = Cookie::build((AUTH_COOKIE, key.key))
                .http_only(true)
                .path("/")
                .same_site(SameSite::Strict)
                .build();
            (
                jar.add(cookie),
                Json(json!({ "message": "Login successful" })),
            )
                .into_response()
        }
        Ok(None) => unauthorized().await,
        Err(err) => internal_error(err),
    }
}

async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    jar: CookieJar,
) -> Response {
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    if let Err(err) = state.ledger.auth.logout(&mut session, &ctx.key).await {
        return internal_error(err);
    }
    let jar = jar.remove(Cookie::build((AUTH_COOKIE, "")).path("/"));
    (jar, Json(json!({ "message": "Logged out" }))).into_response()
}

async fn verify_session(Extension(ctx): Extension<AdminContext>) -> Response {
    Json(json!({ "valid": true, "username": ctx.admin.username })).into_response()
}

async fn list_events(State(state): State<AppState>) -> Response {
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    match state.ledger.events.list(&mut session).await {
        Ok(events) => Json(events).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn create_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(draft): Json<EventDraft>,
) -> Response {
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    session.set_actor(ctx.admin.id);
    match state.ledger.events.create_event(&mut session, draft).await {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(err) => internal_error(err),
    }
}

#[derive(Deserialize)]
struct ToggleForm {
    active: bool,
}

async fn toggle_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(form): Json<ToggleForm>,
) -> Response {
    let Ok(id) = ObjectId::parse_str(&id) else {
        return bad_request("Invalid event id");
    };
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    session.set_actor(ctx.admin.id);
    match state.ledger.events.get(&mut session, id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Training event not found"),
        Err(err) => return internal_error(err),
    }
    match state
        .ledger
        .events
        .set_active(&mut session, id, form.active)
        .await
    {
        Ok(()) => Json(json!({ "message": "Event updated", "active": form.active })).into_response(),
        Err(err) => internal_error(err),
    }
}

#[derive(Deserialize)]
struct ListQuery {
    fecha: Option<NaiveDate>,
    busqueda: Option<String>,
    cargo: Option<String>,
    ruta: Option<String>,
    evento: Option<String>,
}

async fn list_attendees(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let event_id = match parse_event_id(query.evento.as_deref()) {
        Ok(event_id) => event_id,
        Err(response) => return response,
    };
    let filter = AttendeeFilter {
        event_id,
        search: query.busqueda,
        job_title: query.cargo,
        route: query.ruta,
    };
    let date = query.fecha.unwrap_or_else(|| Local::now().date_naive());

    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    match state.ledger.reports.list(&mut session, date, &filter).await {
        Ok(listing) => Json(listing).into_response(),
        Err(err) => report_error(err),
    }
}

async fn dashboard(State(state): State<AppState>) -> Response {
    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    match state
        .ledger
        .reports
        .dashboard(&mut session, Local::now())
        .await
    {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(err) => report_error(err),
    }
}

#[derive(Deserialize)]
struct PdfQuery {
    fecha: Option<NaiveDate>,
    evento: Option<String>,
}

async fn generate_pdf(State(state): State<AppState>, Query(query): Query<PdfQuery>) -> Response {
    let event_id = match parse_event_id(query.evento.as_deref()) {
        Ok(event_id) => event_id,
        Err(response) => return response,
    };
    let date = query.fecha.unwrap_or_else(|| Local::now().date_naive());

    let mut session = match state.ledger.db.start_session().await {
        Ok(session) => session,
        Err(err) => return internal_error(err.into()),
    };
    match state
        .ledger
        .reports
        .render_pdf(&mut session, date, event_id)
        .await
    {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"lista_asistencia_{}.pdf\"",
                        date.format("%Y-%m-%d")
                    ),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => report_error(err),
    }
}

fn parse_event_id(evento: Option<&str>) -> Result<Option<ObjectId>, Response> {
    match evento {
        None => Ok(None),
        Some(raw) => ObjectId::parse_str(raw)
            .map(Some)
            .map_err(|_| bad_request("Invalid event id")),
    }
}

fn report_error(err: ReportError) -> Response {
    let code = match err {
        ReportError::EventNotFound => StatusCode::NOT_FOUND,
        ReportError::NothingToReport(_) => StatusCode::NOT_FOUND,
        ReportError::Common(err) => return internal_error(err),
    };
    (code, Json(json!({ "error": err.to_string() }))).into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}
