use chrono::{DateTime, Local, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// The instructor of record for a training event. At most one per event.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trainer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub event_id: ObjectId,
    pub full_name: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrainerInput {
    pub full_name: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Trainer {
    pub fn new(
        event_id: ObjectId,
        input: TrainerInput,
        signature: Option<String>,
        now: DateTime<Local>,
    ) -> Trainer {
        Trainer {
            id: ObjectId::new(),
            event_id,
            full_name: input.full_name.trim().to_string(),
            signature,
            registered_at: now.with_timezone(&Utc),
        }
    }
}
