//! HTTP surface: a public registration API for attendees and trainers, and a
//! cookie-guarded admin API for configuration, listings and the PDF export.

use std::sync::Arc;

use axum::Router;
use env::Env;
use eyre::{Context as _, Result};
use ledger::Ledger;
use log::info;

pub mod admin;
pub mod context;
pub mod public;

pub async fn serve(ledger: Arc<Ledger>, env: Env) -> Result<()> {
    let state = context::AppState { ledger };
    let app = Router::new()
        .merge(public::routes())
        .nest("/admin", admin::routes(state.clone()))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(env.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", env.bind_addr()))?;
    info!("listening on {}", env.bind_addr());
    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
