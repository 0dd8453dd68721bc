use chrono::{DateTime, Local};
use log::warn;
use model::{
    attendee::{Attendee, AttendeeInput},
    event::Availability,
    session::Session,
    trainer::{Trainer, TrainerInput},
};
use mongodb::bson::oid::ObjectId;
use storage::{attendee::AttendeeStore, event::EventStore, trainer::TrainerStore};
use thiserror::Error;
use tx_macro::tx;

use super::signatures::Signatures;

/// Registration ledger: persists attendee and trainer records, enforcing the
/// per-event uniqueness rules atomically against the store.
#[derive(Clone)]
pub struct Registration {
    events: EventStore,
    attendees: AttendeeStore,
    trainers: TrainerStore,
    signatures: Signatures,
}

impl Registration {
    pub(crate) fn new(
        events: EventStore,
        attendees: AttendeeStore,
        trainers: TrainerStore,
        signatures: Signatures,
    ) -> Self {
        Registration {
            events,
            attendees,
            trainers,
            signatures,
        }
    }

    #[tx]
    pub async fn register_attendee(
        &self,
        session: &mut Session,
        event_id: ObjectId,
        input: AttendeeInput,
        now: DateTime<Local>,
    ) -> Result<Attendee, RegisterError> {
        // The caller already checked eligibility; re-check inside the
        // transaction so a toggle in flight cannot slip a record in.
        let event = self
            .events
            .get(session, event_id)
            .await?
            .ok_or(RegisterError::EventNotFound)?;
        let availability = event.availability(now);
        if !availability.is_open() {
            return Err(RegisterError::NotOpen(availability));
        }

        require(&input.full_name, "full_name")?;
        require(&input.document_type, "document_type")?;
        require(&input.document_number, "document_number")?;
        require(&input.job_title, "job_title")?;
        require(&input.route, "route")?;
        require(&input.city, "city")?;

        let signature = self.store_signature(input.signature.as_deref(), event_id);
        let attendee = Attendee::new(event_id, input, signature, now);
        if !self.attendees.insert(session, &attendee).await? {
            return Err(RegisterError::AlreadyRegistered);
        }
        Ok(attendee)
    }

    #[tx]
    pub async fn register_trainer(
        &self,
        session: &mut Session,
        event_id: ObjectId,
        input: TrainerInput,
        now: DateTime<Local>,
    ) -> Result<Trainer, RegisterError> {
        let event = self
            .events
            .get(session, event_id)
            .await?
            .ok_or(RegisterError::EventNotFound)?;
        let availability = event.availability(now);
        if !availability.is_open() {
            return Err(RegisterError::NotOpen(availability));
        }

        require(&input.full_name, "full_name")?;

        let signature = self.store_signature(input.signature.as_deref(), event_id);
        let trainer = Trainer::new(event_id, input, signature, now);
        if !self.trainers.insert(session, &trainer).await? {
            return Err(RegisterError::TrainerAlreadyRegistered);
        }
        Ok(trainer)
    }

    /// A broken signature never blocks the attendance record; it is dropped
    /// with a warning instead.
    fn store_signature(&self, payload: Option<&str>, event_id: ObjectId) -> Option<String> {
        let payload = payload.map(str::trim).filter(|p| !p.is_empty())?;
        match self.signatures.store(payload) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("dropping signature for event {}: {:#}", event_id, err);
                None
            }
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<(), RegisterError> {
    if value.trim().is_empty() {
        Err(RegisterError::MissingField(field))
    } else {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Training event not found")]
    EventNotFound,
    #[error("{0}")]
    NotOpen(Availability),
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[error("A registration with this document number already exists for this training")]
    AlreadyRegistered,
    #[error("This training already has a trainer of record")]
    TrainerAlreadyRegistered,
    #[error("Common error: {0}")]
    Common(#[from] eyre::Error),
}

impl From<mongodb::error::Error> for RegisterError {
    fn from(e: mongodb::error::Error) -> Self {
        RegisterError::Common(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_whitespace_only_values() {
        assert!(require("  ", "full_name").is_err());
        assert!(require("", "route").is_err());
        assert!(require(" Ana María ", "full_name").is_ok());
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = require("", "document_number").unwrap_err();
        assert_eq!(err.to_string(), "Field 'document_number' is required");
    }
}
