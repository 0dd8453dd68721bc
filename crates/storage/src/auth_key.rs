use std::sync::Arc;

use bson::to_document;
use eyre::{Error, Result};
use model::{auth::AuthKey, session::Session};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::UpdateOptions,
    Collection, IndexModel,
};

const COLLECTION: &str = "auth_keys";

#[derive(Clone)]
pub struct AuthKeys {
    store: Arc<Collection<AuthKey>>,
}

impl AuthKeys {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self> {
        let store: Collection<AuthKey> = db.collection(COLLECTION);
        store
            .create_index(IndexModel::builder().keys(doc! { "key": -1 }).build())
            .await?;

        Ok(AuthKeys {
            store: Arc::new(store),
        })
    }

    /// One key per admin; a fresh key replaces the previous one.
    pub async fn upsert(&self, session: &mut Session, key: &AuthKey) -> Result<(), Error> {
        let mut update = to_document(key)?;
        update.remove("_id");
        self.store
            .update_one(doc! { "_id": key.admin_id }, doc! { "$set": update })
            .with_options(UpdateOptions::builder().upsert(true).build())
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        session: &mut Session,
        admin_id: ObjectId,
    ) -> Result<Option<AuthKey>, Error> {
        Ok(self
            .store
            .find_one(doc! { "_id": admin_id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_by_key(
        &self,
        session: &mut Session,
        key: &str,
    ) -> Result<Option<AuthKey>, Error> {
        Ok(self
            .store
            .find_one(doc! { "key": key })
            .session(&mut *session)
            .await?)
    }

    pub async fn remove_by_key(&self, session: &mut Session, key: &str) -> Result<(), Error> {
        self.store
            .delete_one(doc! { "key": key })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
