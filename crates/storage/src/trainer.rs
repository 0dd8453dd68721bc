use std::sync::Arc;

use bson::to_document;
use eyre::{Error, Result};
use model::{session::Session, trainer::Trainer};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{IndexOptions, UpdateOptions},
    Collection, IndexModel,
};

const COLLECTION: &str = "trainers";

#[derive(Clone)]
pub struct TrainerStore {
    store: Arc<Collection<Trainer>>,
}

impl TrainerStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self> {
        let store: Collection<Trainer> = db.collection(COLLECTION);
        store
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "event_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        Ok(TrainerStore {
            store: Arc::new(store),
        })
    }

    /// Atomic one-trainer-per-event insert. Returns false when the event
    /// already has a trainer of record, whatever the submitted name.
    pub async fn insert(&self, session: &mut Session, trainer: &Trainer) -> Result<bool, Error> {
        let result = self
            .store
            .update_one(
                doc! { "event_id": trainer.event_id },
                doc! { "$setOnInsert": to_document(trainer)? },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .session(&mut *session)
            .await?;
        Ok(result.upserted_id.is_some())
    }

    pub async fn get_by_event(
        &self,
        session: &mut Session,
        event_id: ObjectId,
    ) -> Result<Option<Trainer>, Error> {
        Ok(self
            .store
            .find_one(doc! { "event_id": event_id })
            .session(&mut *session)
            .await?)
    }
}
