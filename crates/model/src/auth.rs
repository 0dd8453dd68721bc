use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// A session key handed out after a successful admin login and stored in an
/// http-only cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthKey {
    #[serde(rename = "_id")]
    pub admin_id: ObjectId,
    pub key: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl AuthKey {
    pub fn gen(admin_id: ObjectId) -> Self {
        let mut buf = [0u8; 32];
        rand::thread_rng().fill(&mut buf);
        AuthKey {
            admin_id,
            key: hex::encode(buf),
            created_at: Utc::now(),
        }
    }
}
