//! Shared fixtures for unit and integration tests.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Resident, ResidentDraft, ResidentFields, ResidentId};

/// Clock that moves forward by a fixed step every time it is read.
///
/// Stores stamp `updated_at` from the clock, so a stepping clock makes
/// "most recently updated first" ordering deterministic.
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            now: Mutex::new(start),
            step,
        }
    }

    /// Clock starting at 2024-01-01T00:00:00Z advancing one second per read.
    pub fn per_second() -> Self {
        let start = match Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() {
            Some(start) => start,
            None => panic!("valid fixture timestamp"),
        };
        Self::new(start, TimeDelta::seconds(1))
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.lock_clock();
        let current = *now;
        *now += self.step;
        current
    }
}

/// Complete, already normalised resident attributes.
pub fn resident_fields(full_name: &str, car_plate: &str, permit_number: &str) -> ResidentFields {
    ResidentFields {
        full_name: full_name.to_owned(),
        section: "GH1".to_owned(),
        building: "B".to_owned(),
        door: "12".to_owned(),
        car_plate: car_plate.to_owned(),
        permit_number: permit_number.to_owned(),
        phone_primary: "0600000000".to_owned(),
        phone_secondary: None,
    }
}

/// Validated draft built from [`resident_fields`].
pub fn resident_draft(full_name: &str, car_plate: &str, permit_number: &str) -> ResidentDraft {
    match ResidentDraft::try_from(resident_fields(full_name, car_plate, permit_number)) {
        Ok(draft) => draft,
        Err(err) => panic!("fixture draft must be valid: {err}"),
    }
}

/// Stored resident stamped with the current time.
pub fn stored_resident(draft: ResidentDraft) -> Resident {
    let now = Utc::now();
    Resident::new(ResidentId::random(), draft, now, now)
}
