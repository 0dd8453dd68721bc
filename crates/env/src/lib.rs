use std::{
    env::var,
    path::{Path, PathBuf},
    sync::Arc,
};

use eyre::{Context, Error};

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

struct EnvInner {
    mongo_url: String,
    bind_addr: String,
    data_dir: PathBuf,
}

impl Env {
    pub fn mongo_url(&self) -> &str {
        &self.0.mongo_url
    }

    pub fn bind_addr(&self) -> &str {
        &self.0.bind_addr
    }

    /// Root of the writable asset store (signature and logo images).
    pub fn data_dir(&self) -> &Path {
        &self.0.data_dir
    }

    pub fn load() -> Result<Env, Error> {
        Ok(Env(Arc::new(EnvInner {
            mongo_url: var("MONGO_URL").context("MONGO_URL is not set")?,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            data_dir: PathBuf::from(var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
        })))
    }
}
