use std::sync::Arc;

use dotenv::dotenv;
use env::Env;
use eyre::Context;
use log::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    let env = Env::load()?;
    info!("connecting to mongo");
    let storage = storage::Storage::new(env.mongo_url())
        .await
        .context("Failed to create storage")?;
    info!("creating ledger");
    let ledger = Arc::new(ledger::Ledger::new(storage, env.data_dir().to_path_buf()));

    // First-start provisioning; the next start retries if it fails.
    match ledger.db.start_session().await {
        Ok(mut session) => {
            if let Err(err) = ledger.bootstrap(&mut session).await {
                warn!("bootstrap failed: {:#}", err);
            }
        }
        Err(err) => warn!("bootstrap skipped: {:#}", err),
    }

    info!("starting server...");
    web::serve(ledger, env).await?;
    Ok(())
}
