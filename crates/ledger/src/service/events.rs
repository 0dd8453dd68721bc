use chrono::{DateTime, Local};
use eyre::{Error, Result};
use log::info;
use model::{
    event::{EventDraft, SystemStatus, TrainingEvent},
    session::Session,
};
use mongodb::bson::oid::ObjectId;
use storage::event::EventStore;
use tx_macro::tx;

/// Configuration registry: holds the training events and answers which one,
/// if any, is currently open for registration.
#[derive(Clone)]
pub struct Events {
    store: EventStore,
}

impl Events {
    pub(crate) fn new(store: EventStore) -> Self {
        Events { store }
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<TrainingEvent>, Error> {
        self.store.get(session, id).await
    }

    pub async fn list(&self, session: &mut Session) -> Result<Vec<TrainingEvent>, Error> {
        self.store.get_all(session).await
    }

    pub async fn count(&self, session: &mut Session) -> Result<u64, Error> {
        self.store.count(session).await
    }

    #[tx]
    pub async fn create_event(
        &self,
        session: &mut Session,
        draft: EventDraft,
    ) -> Result<TrainingEvent> {
        let event = TrainingEvent::new(draft);
        info!("creating event {} (actor {:?})", event.id, session.actor());
        self.store.insert(session, &event).await?;
        if event.active {
            self.store.set_active(session, event.id, true).await?;
        }
        Ok(event)
    }

    #[tx]
    pub async fn set_active(
        &self,
        session: &mut Session,
        id: ObjectId,
        active: bool,
    ) -> Result<()> {
        self.store.set_active(session, id, active).await
    }

    /// The active event whose date is today and whose window contains `now`.
    pub async fn resolve_active(
        &self,
        session: &mut Session,
        now: DateTime<Local>,
    ) -> Result<Option<TrainingEvent>, Error> {
        let active = self.store.find_active(session).await?;
        Ok(pick_open(&active, now).cloned())
    }

    /// What the public status endpoint reports. Falls back from "open now"
    /// to "scheduled today" to "any active event" so the caller can always
    /// explain itself; no event at all is its own message.
    pub async fn status(
        &self,
        session: &mut Session,
        now: DateTime<Local>,
    ) -> Result<SystemStatus, Error> {
        let active = self.store.find_active(session).await?;
        let event = pick_open(&active, now)
            .or_else(|| active.iter().find(|e| e.date == now.date_naive()))
            .or_else(|| active.first());

        Ok(match event {
            Some(event) => {
                let availability = event.availability(now);
                SystemStatus {
                    available: availability.is_open(),
                    reason: availability.to_string(),
                    event: Some(event.clone()),
                }
            }
            None => SystemStatus {
                available: false,
                reason: "No training is scheduled today".to_string(),
                event: None,
            },
        })
    }
}

/// Deterministic pick among overlapping candidates: the stores return events
/// ordered by ascending id, so the oldest open event wins.
fn pick_open(active: &[TrainingEvent], now: DateTime<Local>) -> Option<&TrainingEvent> {
    active.iter().find(|event| event.is_open(now))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone as _};
    use model::event::Company;

    use super::*;

    fn event(date: NaiveDate, start: (u32, u32), end: (u32, u32)) -> TrainingEvent {
        TrainingEvent::new(EventDraft {
            topic: "Primeros auxilios".to_string(),
            city: "Medellín".to_string(),
            modality: "Presencial".to_string(),
            date,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            active: true,
            advisor: "Asesora".to_string(),
            company: Company {
                name: "Mi Empresa".to_string(),
                address: "Calle 1".to_string(),
                phone: "555".to_string(),
                logo: None,
            },
        })
    }

    #[test]
    fn picks_the_first_open_event_among_overlaps() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let now = Local.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).single().unwrap();
        let first = event(date, (8, 0), (17, 0));
        let second = event(date, (9, 0), (12, 0));

        let events = [first.clone(), second];
        let picked = pick_open(&events, now).unwrap();
        assert_eq!(picked.id, first.id);
    }

    #[test]
    fn skips_events_outside_their_window() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let now = Local.with_ymd_and_hms(2025, 3, 1, 13, 0, 0).single().unwrap();
        let morning = event(date, (8, 0), (12, 0));
        let afternoon = event(date, (13, 0), (17, 0));

        let events = [morning, afternoon.clone()];
        let picked = pick_open(&events, now).unwrap();
        assert_eq!(picked.id, afternoon.id);
    }

    #[test]
    fn no_candidate_when_nothing_is_open() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let now = Local.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).single().unwrap();
        assert!(pick_open(&[event(date, (8, 0), (17, 0))], now).is_none());
    }
}
