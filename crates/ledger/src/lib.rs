use std::path::PathBuf;

use chrono::{Local, NaiveTime};
use eyre::Result;
use log::info;
use model::{
    admin::{Admin, DEFAULT_PASSWORD, DEFAULT_USERNAME},
    event::{Company, EventDraft},
    session::Session,
};
use service::{
    auth::Auth, events::Events, registration::Registration, reports::Reports,
    signatures::Signatures,
};
use storage::{session::Db, Storage};
use tx_macro::tx;

pub mod service;

#[derive(Clone)]
pub struct Ledger {
    pub db: Db,
    pub events: Events,
    pub registration: Registration,
    pub reports: Reports,
    pub auth: Auth,
}

impl Ledger {
    pub fn new(storage: Storage, data_dir: PathBuf) -> Self {
        let signatures = Signatures::new(data_dir);
        let events = Events::new(storage.events.clone());
        let registration = Registration::new(
            storage.events.clone(),
            storage.attendees.clone(),
            storage.trainers.clone(),
            signatures.clone(),
        );
        let reports = Reports::new(
            storage.events,
            storage.attendees,
            storage.trainers,
            signatures,
        );
        let auth = Auth::new(storage.admins, storage.auth_keys);
        Ledger {
            db: storage.db,
            events,
            registration,
            reports,
            auth,
        }
    }

    /// First-start provisioning: a default admin account and a placeholder
    /// event for today when the respective collections are empty. Callers
    /// treat failures as non-fatal; the next start tries again.
    #[tx]
    pub async fn bootstrap(&self, session: &mut Session) -> Result<()> {
        let admin = Admin::new(DEFAULT_USERNAME, DEFAULT_PASSWORD);
        if self.auth.provision(session, &admin).await? {
            info!("created default admin '{}'", DEFAULT_USERNAME);
        }

        if self.events.count(session).await? == 0 {
            let today = Local::now().date_naive();
            // Already inside this transaction, so skip the `#[tx]` wrapper.
            let event = self
                .events
                .create_event_in_tx(
                    session,
                    EventDraft {
                        topic: "Capacitación de Seguridad".to_string(),
                        city: "Ciudad Capacitación".to_string(),
                        modality: "Presencial".to_string(),
                        date: today,
                        start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
                        end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
                        active: true,
                        advisor: "Empresa Asesora".to_string(),
                        company: Company {
                            name: "Mi Empresa".to_string(),
                            address: "Calle Principal #123, Ciudad".to_string(),
                            phone: "+57 300 123 4567".to_string(),
                            logo: None,
                        },
                    },
                )
                .await?;
            info!("created placeholder training event {}", event.id);
        }
        Ok(())
    }
}

pub use service::registration::RegisterError;
pub use service::reports::ReportError;
