use std::sync::Arc;

use bson::{to_document, Bson};
use chrono::NaiveDate;
use eyre::{Error, Result};
use model::{attendee::Attendee, session::Session};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{IndexOptions, UpdateOptions},
    Collection, IndexModel,
};

use crate::event::date_key;

const COLLECTION: &str = "attendees";

/// Optional narrowing for attendee listings. All text filters are
/// case-insensitive substring matches.
#[derive(Debug, Default, Clone)]
pub struct AttendeeFilter {
    pub event_id: Option<ObjectId>,
    pub search: Option<String>,
    pub job_title: Option<String>,
    pub route: Option<String>,
}

#[derive(Clone)]
pub struct AttendeeStore {
    store: Arc<Collection<Attendee>>,
}

impl AttendeeStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self> {
        let store: Collection<Attendee> = db.collection(COLLECTION);
        store
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "event_id": 1, "document_number": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        store
            .create_index(IndexModel::builder().keys(doc! { "date": 1 }).build())
            .await?;

        Ok(AttendeeStore {
            store: Arc::new(store),
        })
    }

    /// Atomic check-then-insert keyed on (event, document number). Returns
    /// false when a registration for that pair already exists.
    pub async fn insert(&self, session: &mut Session, attendee: &Attendee) -> Result<bool, Error> {
        let result = self
            .store
            .update_one(
                doc! {
                    "event_id": attendee.event_id,
                    "document_number": &attendee.document_number,
                },
                doc! { "$setOnInsert": to_document(attendee)? },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .session(&mut *session)
            .await?;
        Ok(result.upserted_id.is_some())
    }

    pub async fn find_by_date(
        &self,
        session: &mut Session,
        date: NaiveDate,
        filter: &AttendeeFilter,
    ) -> Result<Vec<Attendee>, Error> {
        let mut query = doc! { "date": date_key(date) };
        if let Some(event_id) = filter.event_id {
            query.insert("event_id", event_id);
        }
        if let Some(search) = non_empty(&filter.search) {
            query.insert(
                "$or",
                vec![
                    doc! { "full_name": { "$regex": search, "$options": "i" } },
                    doc! { "document_number": { "$regex": search, "$options": "i" } },
                ],
            );
        }
        if let Some(job_title) = non_empty(&filter.job_title) {
            query.insert("job_title", doc! { "$regex": job_title, "$options": "i" });
        }
        if let Some(route) = non_empty(&filter.route) {
            query.insert("route", doc! { "$regex": route, "$options": "i" });
        }

        let mut cursor = self
            .store
            .find(query)
            .sort(doc! { "arrived_at": 1, "_id": 1 })
            .session(&mut *session)
            .await?;
        let mut attendees = Vec::new();
        while let Some(attendee) = cursor.next(&mut *session).await {
            attendees.push(attendee?);
        }
        Ok(attendees)
    }

    /// Distinct events that had at least one registration on the given date.
    pub async fn event_ids_on(
        &self,
        session: &mut Session,
        date: NaiveDate,
    ) -> Result<Vec<ObjectId>, Error> {
        let values = self
            .store
            .distinct("event_id", doc! { "date": date_key(date) })
            .session(&mut *session)
            .await?;
        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::ObjectId(id) => Some(id),
                _ => None,
            })
            .collect())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
