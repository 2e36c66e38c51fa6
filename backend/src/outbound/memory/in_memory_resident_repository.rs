//! In-memory implementation of [`ResidentRepository`].
//!
//! The primary map and both unique indices live behind a single lock, so a
//! uniqueness check and the write that depends on it can never interleave
//! with another writer.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;

use crate::domain::ports::{
    InsertOutcome, InsertRejection, ResidentRepository, ResidentRepositoryError,
};
use crate::domain::{Resident, ResidentDraft, ResidentId, ResidentSearch, UniqueField};

/// Uniqueness constraints in the order they are checked.
const CONSTRAINTS: [UniqueField; 2] = [UniqueField::CarPlate, UniqueField::PermitNumber];

#[derive(Default)]
struct Indexed {
    records: HashMap<ResidentId, Resident>,
    by_car_plate: HashMap<String, ResidentId>,
    by_permit_number: HashMap<String, ResidentId>,
}

impl Indexed {
    fn index(&self, field: UniqueField) -> &HashMap<String, ResidentId> {
        match field {
            UniqueField::CarPlate => &self.by_car_plate,
            UniqueField::PermitNumber => &self.by_permit_number,
        }
    }

    fn index_mut(&mut self, field: UniqueField) -> &mut HashMap<String, ResidentId> {
        match field {
            UniqueField::CarPlate => &mut self.by_car_plate,
            UniqueField::PermitNumber => &mut self.by_permit_number,
        }
    }

    /// First constraint the draft would violate, ignoring `owner`'s own values.
    fn collision(&self, draft: &ResidentDraft, owner: Option<&ResidentId>) -> Option<UniqueField> {
        CONSTRAINTS.into_iter().find(|field| {
            self.index(*field)
                .get(draft.unique_value(*field))
                .is_some_and(|holder| Some(holder) != owner)
        })
    }

    fn unindex(&mut self, resident: &Resident) {
        for field in CONSTRAINTS {
            self.index_mut(field)
                .remove(resident.draft().unique_value(field));
        }
    }

    fn store(&mut self, resident: Resident) {
        for field in CONSTRAINTS {
            let value = resident.draft().unique_value(field).to_owned();
            self.index_mut(field).insert(value, *resident.id());
        }
        self.records.insert(*resident.id(), resident);
    }

    fn insert(&mut self, draft: &ResidentDraft, clock: &dyn Clock) -> Result<Resident, UniqueField> {
        if let Some(field) = self.collision(draft, None) {
            return Err(field);
        }
        let now = clock.utc();
        let resident = Resident::new(ResidentId::random(), draft.clone(), now, now);
        self.store(resident.clone());
        Ok(resident)
    }
}

/// Sort most recently updated first, newest creation breaking ties.
fn newest_first(mut residents: Vec<Resident>) -> Vec<Resident> {
    residents.sort_by_key(|resident| {
        (
            Reverse(resident.updated_at()),
            Reverse(resident.created_at()),
            *resident.id(),
        )
    });
    residents
}

/// Resident store held entirely in process memory.
///
/// # Examples
/// ```
/// use resident_directory::outbound::memory::InMemoryResidentRepository;
///
/// let repo = InMemoryResidentRepository::default();
/// # let _ = repo;
/// ```
pub struct InMemoryResidentRepository {
    state: RwLock<Indexed>,
    clock: Arc<dyn Clock>,
}

impl InMemoryResidentRepository {
    /// Create an empty store stamping records with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(Indexed::default()),
            clock,
        }
    }
}

impl Default for InMemoryResidentRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

#[async_trait]
impl ResidentRepository for InMemoryResidentRepository {
    async fn insert(&self, draft: &ResidentDraft) -> Result<Resident, ResidentRepositoryError> {
        let mut state = self.state.write().await;
        state
            .insert(draft, self.clock.as_ref())
            .map_err(ResidentRepositoryError::duplicate)
    }

    async fn insert_many(
        &self,
        drafts: &[ResidentDraft],
    ) -> Result<Vec<InsertOutcome>, ResidentRepositoryError> {
        let mut state = self.state.write().await;
        let outcomes = drafts
            .iter()
            .map(|draft| match state.insert(draft, self.clock.as_ref()) {
                Ok(resident) => InsertOutcome::Inserted(resident),
                Err(field) => InsertOutcome::Rejected(InsertRejection::Duplicate { field }),
            })
            .collect();
        Ok(outcomes)
    }

    async fn find_all(&self) -> Result<Vec<Resident>, ResidentRepositoryError> {
        let state = self.state.read().await;
        Ok(newest_first(state.records.values().cloned().collect()))
    }

    async fn find_by_id(&self, id: &ResidentId) -> Result<Option<Resident>, ResidentRepositoryError> {
        let state = self.state.read().await;
        Ok(state.records.get(id).cloned())
    }

    async fn search(&self, filter: &ResidentSearch) -> Result<Vec<Resident>, ResidentRepositoryError> {
        let state = self.state.read().await;
        let matching = state
            .records
            .values()
            .filter(|resident| filter.matches(resident))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn replace(
        &self,
        id: &ResidentId,
        draft: &ResidentDraft,
    ) -> Result<Resident, ResidentRepositoryError> {
        let mut state = self.state.write().await;
        if !state.records.contains_key(id) {
            return Err(ResidentRepositoryError::not_found(*id));
        }
        if let Some(field) = state.collision(draft, Some(id)) {
            return Err(ResidentRepositoryError::duplicate(field));
        }

        let Some(current) = state.records.remove(id) else {
            return Err(ResidentRepositoryError::not_found(*id));
        };
        state.unindex(&current);
        let revised = current.revise(draft.clone(), self.clock.utc());
        state.store(revised.clone());
        Ok(revised)
    }

    async fn delete(&self, id: &ResidentId) -> Result<(), ResidentRepositoryError> {
        let mut state = self.state.write().await;
        if let Some(removed) = state.records.remove(id) {
            state.unindex(&removed);
        }
        Ok(())
    }
}
