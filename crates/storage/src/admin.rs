use std::sync::Arc;

use bson::to_document;
use eyre::{Error, Result};
use model::{admin::Admin, session::Session};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{IndexOptions, UpdateOptions},
    Collection, IndexModel,
};

const COLLECTION: &str = "admins";

#[derive(Clone)]
pub struct AdminStore {
    store: Arc<Collection<Admin>>,
}

impl AdminStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self> {
        let store: Collection<Admin> = db.collection(COLLECTION);
        store
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        Ok(AdminStore {
            store: Arc::new(store),
        })
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Admin>, Error> {
        Ok(self
            .store
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_by_username(
        &self,
        session: &mut Session,
        username: &str,
    ) -> Result<Option<Admin>, Error> {
        Ok(self
            .store
            .find_one(doc! { "username": username })
            .session(&mut *session)
            .await?)
    }

    /// Returns false when an admin with that username already exists.
    pub async fn insert(&self, session: &mut Session, admin: &Admin) -> Result<bool, Error> {
        let result = self
            .store
            .update_one(
                doc! { "username": &admin.username },
                doc! { "$setOnInsert": to_document(admin)? },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .session(&mut *session)
            .await?;
        Ok(result.upserted_id.is_some())
    }
}
