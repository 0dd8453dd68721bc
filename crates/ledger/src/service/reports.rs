use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use model::{attendee::Attendee, event::TrainingEvent, session::Session};
use mongodb::bson::oid::ObjectId;
use report::{CompanyBlock, Header, RowInput, SheetLayout};
use serde::Serialize;
use storage::{
    attendee::{AttendeeFilter, AttendeeStore},
    event::EventStore,
    trainer::TrainerStore,
};
use thiserror::Error;

use super::signatures::Signatures;

/// Report assembler: turns a day of registrations into the sign-in sheet
/// layout and renders it, and backs the admin listing/dashboard views.
#[derive(Clone)]
pub struct Reports {
    events: EventStore,
    attendees: AttendeeStore,
    trainers: TrainerStore,
    signatures: Signatures,
}

#[derive(Debug, Serialize)]
pub struct AttendeeListing {
    pub date: NaiveDate,
    pub attendees: Vec<Attendee>,
    pub stats: ListingStats,
}

#[derive(Debug, Serialize)]
pub struct ListingStats {
    pub total: usize,
    pub job_titles: Vec<String>,
    pub routes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub total: u64,
    pub by_job_title: BTreeMap<String, u64>,
    pub by_route: BTreeMap<String, u64>,
    pub available: bool,
}

impl Reports {
    pub(crate) fn new(
        events: EventStore,
        attendees: AttendeeStore,
        trainers: TrainerStore,
        signatures: Signatures,
    ) -> Self {
        Reports {
            events,
            attendees,
            trainers,
            signatures,
        }
    }

    /// One section per training event that had registrations on `date` (or
    /// exactly the requested event, empty or not), rows ordered by arrival.
    pub async fn sign_in_sheet(
        &self,
        session: &mut Session,
        date: NaiveDate,
        event_id: Option<ObjectId>,
    ) -> Result<SheetLayout, ReportError> {
        let targets = match event_id {
            Some(id) => vec![self
                .events
                .get(session, id)
                .await?
                .ok_or(ReportError::EventNotFound)?],
            None => {
                let mut ids = self.attendees.event_ids_on(session, date).await?;
                ids.sort();
                let mut events = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(event) = self.events.get(session, id).await? {
                        events.push(event);
                    }
                }
                events
            }
        };
        if targets.is_empty() {
            return Err(ReportError::NothingToReport(date));
        }

        let mut sections = Vec::with_capacity(targets.len());
        for event in targets {
            let trainer = self.trainers.get_by_event(session, event.id).await?;
            let attendees = self
                .attendees
                .find_by_date(
                    session,
                    date,
                    &AttendeeFilter {
                        event_id: Some(event.id),
                        ..AttendeeFilter::default()
                    },
                )
                .await?;
            sections.push((self.header(&event, trainer.as_ref(), date), self.rows(attendees)));
        }
        Ok(SheetLayout::assemble(date, sections))
    }

    pub async fn render_pdf(
        &self,
        session: &mut Session,
        date: NaiveDate,
        event_id: Option<ObjectId>,
    ) -> Result<Vec<u8>, ReportError> {
        let layout = self.sign_in_sheet(session, date, event_id).await?;
        Ok(report::render(&layout)?)
    }

    pub async fn list(
        &self,
        session: &mut Session,
        date: NaiveDate,
        filter: &AttendeeFilter,
    ) -> Result<AttendeeListing, ReportError> {
        let attendees = self.attendees.find_by_date(session, date, filter).await?;
        let stats = ListingStats {
            total: attendees.len(),
            job_titles: distinct(attendees.iter().map(|a| a.job_title.as_str())),
            routes: distinct(attendees.iter().map(|a| a.route.as_str())),
        };
        Ok(AttendeeListing {
            date,
            attendees,
            stats,
        })
    }

    pub async fn dashboard(
        &self,
        session: &mut Session,
        now: DateTime<Local>,
    ) -> Result<Dashboard, ReportError> {
        let date = now.date_naive();
        let attendees = self
            .attendees
            .find_by_date(session, date, &AttendeeFilter::default())
            .await?;
        let mut by_job_title = BTreeMap::new();
        let mut by_route = BTreeMap::new();
        for attendee in &attendees {
            *by_job_title.entry(attendee.job_title.clone()).or_default() += 1;
            *by_route.entry(attendee.route.clone()).or_default() += 1;
        }

        let active = self.events.find_active(session).await?;
        let available = active.iter().any(|event| event.is_open(now));
        Ok(Dashboard {
            date,
            total: attendees.len() as u64,
            by_job_title,
            by_route,
            available,
        })
    }

    fn header(&self, event: &TrainingEvent, trainer: Option<&model::trainer::Trainer>, date: NaiveDate) -> Header {
        Header {
            topic: event.topic.clone(),
            city: event.city.clone(),
            modality: event.modality.clone(),
            date,
            start: event.start_time,
            end: event.end_time,
            advisor: event.advisor.clone(),
            trainer_name: trainer.map(|t| t.full_name.clone()),
            trainer_signature: trainer
                .and_then(|t| t.signature.as_deref())
                .map(|rel| self.signatures.resolve(rel)),
            company: CompanyBlock {
                name: event.company.name.clone(),
                address: event.company.address.clone(),
                phone: event.company.phone.clone(),
                logo: event
                    .company
                    .logo
                    .as_deref()
                    .map(|rel| self.signatures.resolve(rel)),
            },
        }
    }

    fn rows(&self, attendees: Vec<Attendee>) -> Vec<RowInput> {
        attendees
            .into_iter()
            .map(|a| RowInput {
                document_type: a.document_type,
                document_number: a.document_number,
                full_name: a.full_name,
                job_title: a.job_title,
                city: a.city,
                route: a.route,
                signature: a.signature.as_deref().map(|rel| self.signatures.resolve(rel)),
            })
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Training event not found")]
    EventNotFound,
    #[error("No attendance was recorded on {0}")]
    NothingToReport(NaiveDate),
    #[error("Common error: {0}")]
    Common(#[from] eyre::Error),
}

impl From<mongodb::error::Error> for ReportError {
    fn from(e: mongodb::error::Error) -> Self {
        ReportError::Common(e.into())
    }
}
