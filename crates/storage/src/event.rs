use std::sync::Arc;

use chrono::NaiveDate;
use eyre::{eyre, Error, Result};
use log::info;
use model::{event::TrainingEvent, session::Session};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, IndexModel,
};

const COLLECTION: &str = "events";

#[derive(Clone)]
pub struct EventStore {
    store: Arc<Collection<TrainingEvent>>,
}

impl EventStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self> {
        let store: Collection<TrainingEvent> = db.collection(COLLECTION);
        store
            .create_index(IndexModel::builder().keys(doc! { "active": 1, "date": 1 }).build())
            .await?;

        Ok(EventStore {
            store: Arc::new(store),
        })
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<TrainingEvent>, Error> {
        Ok(self
            .store
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_all(&self, session: &mut Session) -> Result<Vec<TrainingEvent>, Error> {
        self.collect(session, doc! {}).await
    }

    pub async fn find_active(&self, session: &mut Session) -> Result<Vec<TrainingEvent>, Error> {
        self.collect(session, doc! { "active": true }).await
    }

    pub async fn insert(&self, session: &mut Session, event: &TrainingEvent) -> Result<(), Error> {
        self.store.insert_one(event).session(&mut *session).await?;
        Ok(())
    }

    /// The single write path for the activation flag. Activating one event
    /// deactivates every other inside the same session, so a transactional
    /// reader never observes two active events.
    pub async fn set_active(
        &self,
        session: &mut Session,
        id: ObjectId,
        active: bool,
    ) -> Result<(), Error> {
        info!("Set active flag: {} {}", id, active);
        if active {
            self.store
                .update_many(doc! { "_id": { "$ne": id } }, doc! { "$set": { "active": false } })
                .session(&mut *session)
                .await?;
        }

        let result = self
            .store
            .update_one(doc! { "_id": id }, doc! { "$set": { "active": active } })
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(eyre!("Training event not found: {}", id));
        }
        Ok(())
    }

    pub async fn count(&self, session: &mut Session) -> Result<u64, Error> {
        Ok(self
            .store
            .count_documents(doc! {})
            .session(&mut *session)
            .await?)
    }

    async fn collect(
        &self,
        session: &mut Session,
        filter: bson::Document,
    ) -> Result<Vec<TrainingEvent>, Error> {
        let mut cursor = self
            .store
            .find(filter)
            .sort(doc! { "_id": 1 })
            .session(&mut *session)
            .await?;
        let mut events = Vec::new();
        while let Some(event) = cursor.next(&mut *session).await {
            events.push(event?);
        }
        Ok(events)
    }
}

pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
