//! Internal Diesel row models for the `residents` table.
//!
//! These types never leave the persistence adapter; conversion into domain
//! types happens in the repository.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ResidentDraft;

use super::schema::residents;

/// Row struct for reading from the residents table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = residents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResidentRow {
    pub id: Uuid,
    pub full_name: String,
    pub section: String,
    pub building: String,
    pub door: String,
    pub car_plate: String,
    pub permit_number: String,
    pub phone_primary: String,
    pub phone_secondary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating resident records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = residents)]
pub(crate) struct NewResidentRow<'a> {
    pub id: Uuid,
    pub full_name: &'a str,
    pub section: &'a str,
    pub building: &'a str,
    pub door: &'a str,
    pub car_plate: &'a str,
    pub permit_number: &'a str,
    pub phone_primary: &'a str,
    pub phone_secondary: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewResidentRow<'a> {
    pub fn from_draft(id: Uuid, draft: &'a ResidentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: draft.full_name(),
            section: draft.section(),
            building: draft.building(),
            door: draft.door(),
            car_plate: draft.car_plate(),
            permit_number: draft.permit_number(),
            phone_primary: draft.phone_primary(),
            phone_secondary: draft.phone_secondary(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset replacing every mutable column of a resident.
///
/// `phone_secondary: None` must clear the column rather than skip it.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = residents)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ResidentChangeset<'a> {
    pub full_name: &'a str,
    pub section: &'a str,
    pub building: &'a str,
    pub door: &'a str,
    pub car_plate: &'a str,
    pub permit_number: &'a str,
    pub phone_primary: &'a str,
    pub phone_secondary: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ResidentChangeset<'a> {
    pub fn from_draft(draft: &'a ResidentDraft, now: DateTime<Utc>) -> Self {
        Self {
            full_name: draft.full_name(),
            section: draft.section(),
            building: draft.building(),
            door: draft.door(),
            car_plate: draft.car_plate(),
            permit_number: draft.permit_number(),
            phone_primary: draft.phone_primary(),
            phone_secondary: draft.phone_secondary(),
            updated_at: now,
        }
    }
}
