use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One scheduled training with its own registration window and activation
/// flag. Attendees may only self-register while the event is open.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TrainingEvent {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub topic: String,
    pub city: String,
    pub modality: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub active: bool,
    pub advisor: String,
    pub company: Company,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Company {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Fields the administrator submits to create a new event. Events are never
/// edited in place; a replacement is created instead.
#[derive(Debug, Deserialize, Clone)]
pub struct EventDraft {
    pub topic: String,
    pub city: String,
    pub modality: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub active: bool,
    pub advisor: String,
    pub company: Company,
}

impl TrainingEvent {
    pub fn new(draft: EventDraft) -> TrainingEvent {
        TrainingEvent {
            id: ObjectId::new(),
            topic: draft.topic,
            city: draft.city,
            modality: draft.modality,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            active: draft.active,
            advisor: draft.advisor,
            company: draft.company,
            created_at: Utc::now(),
        }
    }

    pub fn availability(&self, now: DateTime<Local>) -> Availability {
        if !self.active {
            return Availability::Disabled;
        }
        if now.date_naive() != self.date {
            return Availability::WrongDate(self.date);
        }

        let time = now.time();
        if time < self.start_time || time > self.end_time {
            Availability::OutsideHours(self.start_time, self.end_time)
        } else {
            Availability::Open
        }
    }

    pub fn is_open(&self, now: DateTime<Local>) -> bool {
        self.availability(now).is_open()
    }
}

/// Why the registration form is or is not accepting submissions right now.
/// Exactly one reason applies; flag beats date beats time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Open,
    Disabled,
    WrongDate(NaiveDate),
    OutsideHours(NaiveTime, NaiveTime),
}

impl Availability {
    pub fn is_open(&self) -> bool {
        matches!(self, Availability::Open)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Open => write!(f, "The sign-in form is available"),
            Availability::Disabled => write!(f, "The sign-in form is disabled"),
            Availability::WrongDate(date) => {
                write!(f, "The training is scheduled for {}", date.format("%d/%m/%Y"))
            }
            Availability::OutsideHours(start, end) => write!(
                f,
                "The sign-in form is open from {} to {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
        }
    }
}

/// Answer for the public status endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct SystemStatus {
    pub available: bool,
    pub reason: String,
    pub event: Option<TrainingEvent>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn event(active: bool) -> TrainingEvent {
        TrainingEvent::new(EventDraft {
            topic: "Workplace safety".to_string(),
            city: "Bogotá".to_string(),
            modality: "In person".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            active,
            advisor: "Advisory Corp".to_string(),
            company: Company {
                name: "Mi Empresa".to_string(),
                address: "Calle Principal #123".to_string(),
                phone: "+57 300 123 4567".to_string(),
                logo: None,
            },
        })
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn open_within_window() {
        assert!(event(true).is_open(at(2025, 3, 1, 10, 0)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let e = event(true);
        assert!(e.is_open(at(2025, 3, 1, 8, 0)));
        assert!(e.is_open(at(2025, 3, 1, 17, 0)));
    }

    #[test]
    fn closed_before_opening() {
        let e = event(true);
        let availability = e.availability(at(2025, 3, 1, 7, 59));
        assert_eq!(
            availability,
            Availability::OutsideHours(e.start_time, e.end_time)
        );
        assert_eq!(
            availability.to_string(),
            "The sign-in form is open from 08:00 to 17:00"
        );
    }

    #[test]
    fn closed_on_another_day() {
        let e = event(true);
        let availability = e.availability(at(2025, 3, 2, 10, 0));
        assert_eq!(availability, Availability::WrongDate(e.date));
        assert_eq!(
            availability.to_string(),
            "The training is scheduled for 01/03/2025"
        );
    }

    #[test]
    fn disabled_wins_over_every_other_reason() {
        // Wrong date and outside hours at once, but the flag is checked first.
        let e = event(false);
        assert_eq!(e.availability(at(2025, 3, 2, 3, 0)), Availability::Disabled);
    }
}
