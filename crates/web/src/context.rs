use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use eyre::Error;
use ledger::Ledger;
use log::{error, warn};
use model::admin::Admin;
use serde_json::json;
use tokio::time::sleep;

pub const AUTH_COOKIE: &str = "admin_auth";

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

/// The authenticated admin and the key that proved it, handed to guarded
/// handlers as an extension.
#[derive(Clone)]
pub struct AdminContext {
    pub admin: Admin,
    pub key: String,
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(key) = CookieJar::from_headers(request.headers())
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
    else {
        return unauthorized().await;
    };

    match authenticate(&state, &key).await {
        Ok(Some(admin)) => {
            request.extensions_mut().insert(AdminContext { admin, key });
            next.run(request).await
        }
        Ok(None) => {
            warn!("rejected admin request with a stale or unknown key");
            unauthorized().await
        }
        Err(err) => internal_error(err),
    }
}

async fn authenticate(state: &AppState, key: &str) -> Result<Option<Admin>, Error> {
    let mut session = state.ledger.db.start_session().await?;
    state.ledger.auth.authenticate(&mut session, key).await
}

pub(crate) async fn unauthorized() -> Response {
    sleep(Duration::from_secs(1)).await;
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

pub(crate) fn internal_error(err: Error) -> Response {
    error!("request failed: {:#}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal error" })),
    )
        .into_response()
}
