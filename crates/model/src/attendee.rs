use chrono::{DateTime, Local, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One self-registration record. Immutable once created.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Attendee {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub event_id: ObjectId,
    pub full_name: String,
    pub document_type: String,
    pub document_number: String,
    pub job_title: String,
    pub route: String,
    pub city: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub arrived_at: DateTime<Utc>,
    pub date: NaiveDate,
    #[serde(default)]
    pub signature: Option<String>,
}

/// What the public registration form submits. The signature is a base64
/// encoded image, optionally wrapped in a `data:` URL.
#[derive(Debug, Deserialize, Clone)]
pub struct AttendeeInput {
    pub full_name: String,
    pub document_type: String,
    pub document_number: String,
    pub job_title: String,
    pub route: String,
    pub city: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Attendee {
    pub fn new(
        event_id: ObjectId,
        input: AttendeeInput,
        signature: Option<String>,
        now: DateTime<Local>,
    ) -> Attendee {
        Attendee {
            id: ObjectId::new(),
            event_id,
            full_name: input.full_name.trim().to_string(),
            document_type: input.document_type.trim().to_string(),
            document_number: input.document_number.trim().to_string(),
            job_title: input.job_title.trim().to_string(),
            route: input.route.trim().to_string(),
            city: input.city.trim().to_string(),
            arrived_at: now.with_timezone(&Utc),
            date: now.date_naive(),
            signature,
        }
    }
}
