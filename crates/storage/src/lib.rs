pub mod admin;
pub mod attendee;
pub mod auth_key;
pub mod event;
pub mod session;
pub mod trainer;

use admin::AdminStore;
use attendee::AttendeeStore;
use auth_key::AuthKeys;
use event::EventStore;
use eyre::Result;
use session::Db;
use trainer::TrainerStore;

const DB_NAME: &str = "attendance_db";

#[derive(Clone)]
pub struct Storage {
    pub db: Db,
    pub events: EventStore,
    pub attendees: AttendeeStore,
    pub trainers: TrainerStore,
    pub admins: AdminStore,
    pub auth_keys: AuthKeys,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        let db = Db::new(uri, DB_NAME).await?;
        let events = EventStore::new(&db).await?;
        let attendees = AttendeeStore::new(&db).await?;
        let trainers = TrainerStore::new(&db).await?;
        let admins = AdminStore::new(&db).await?;
        let auth_keys = AuthKeys::new(&db).await?;

        Ok(Storage {
            db,
            events,
            attendees,
            trainers,
            admins,
            auth_keys,
        })
    }
}
