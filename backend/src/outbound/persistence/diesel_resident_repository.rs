//! PostgreSQL-backed `ResidentRepository` implementation using Diesel ORM.
//!
//! Uniqueness is enforced by the database's `UNIQUE` constraints; violations
//! are classified by constraint name. Bulk inserts run one autocommit insert
//! per record on a single connection so every record gets its own outcome.

use std::ops::ControlFlow;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    InsertOutcome, InsertRejection, ResidentRepository, ResidentRepositoryError,
};
use crate::domain::{Resident, ResidentDraft, ResidentFields, ResidentId, ResidentSearch};

use super::models::{NewResidentRow, ResidentChangeset, ResidentRow};
use super::pool::DbPool;
use super::resident_error_mapping::{insert_rejection, map_diesel_error, map_pool_error};
use super::schema::residents;

/// Diesel-backed implementation of the resident repository port.
#[derive(Clone)]
pub struct DieselResidentRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselResidentRepository {
    /// Create a new repository with the given pool and timestamp source.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

/// Escape `LIKE` metacharacters so a name fragment matches literally.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Convert a database row into a validated domain resident.
fn row_to_resident(row: ResidentRow) -> Result<Resident, ResidentRepositoryError> {
    let ResidentRow {
        id,
        full_name,
        section,
        building,
        door,
        car_plate,
        permit_number,
        phone_primary,
        phone_secondary,
        created_at,
        updated_at,
    } = row;

    let draft = ResidentDraft::try_from(ResidentFields {
        full_name,
        section,
        building,
        door,
        car_plate,
        permit_number,
        phone_primary,
        phone_secondary,
    })
    .map_err(|err| ResidentRepositoryError::query(format!("stored resident {id}: {err}")))?;

    Ok(Resident::new(
        ResidentId::from_uuid(id),
        draft,
        created_at,
        updated_at,
    ))
}

fn rows_to_residents(rows: Vec<ResidentRow>) -> Result<Vec<Resident>, ResidentRepositoryError> {
    rows.into_iter().map(row_to_resident).collect()
}

/// Per-record outcomes of a bulk insert, in submission order.
struct BulkInsert {
    total: usize,
    outcomes: Vec<InsertOutcome>,
}

impl BulkInsert {
    fn new(total: usize) -> Self {
        Self {
            total,
            outcomes: Vec::with_capacity(total),
        }
    }

    fn has_inserted(&self) -> bool {
        self.outcomes.iter().any(|outcome| outcome.inserted().is_some())
    }

    /// Record the next attempt.
    ///
    /// A lost connection before anything was written fails the whole batch.
    /// Once writes have happened it marks every remaining record as failed and
    /// breaks, so the caller still learns exactly what was persisted.
    fn record(
        &mut self,
        result: Result<Resident, ResidentRepositoryError>,
    ) -> Result<ControlFlow<()>, ResidentRepositoryError> {
        let error = match result {
            Ok(resident) => {
                self.outcomes.push(InsertOutcome::Inserted(resident));
                return Ok(ControlFlow::Continue(()));
            }
            Err(error) => error,
        };

        match insert_rejection(error) {
            Ok(rejection) => {
                self.outcomes.push(InsertOutcome::Rejected(rejection));
                Ok(ControlFlow::Continue(()))
            }
            Err(error) if !self.has_inserted() => Err(error),
            Err(error) => {
                let remaining = self.total - self.outcomes.len();
                tracing::warn!(%error, remaining, "connection lost during bulk insert");
                let message = error.to_string();
                self.outcomes.extend((0..remaining).map(|_| {
                    InsertOutcome::Rejected(InsertRejection::Failed {
                        message: message.clone(),
                    })
                }));
                Ok(ControlFlow::Break(()))
            }
        }
    }

    fn finish(self) -> Vec<InsertOutcome> {
        self.outcomes
    }
}

impl DieselResidentRepository {
    async fn insert_on(
        &self,
        conn: &mut AsyncPgConnection,
        draft: &ResidentDraft,
    ) -> Result<Resident, ResidentRepositoryError> {
        let row = NewResidentRow::from_draft(Uuid::new_v4(), draft, self.clock.utc());
        let stored: ResidentRow = diesel::insert_into(residents::table)
            .values(&row)
            .returning(ResidentRow::as_returning())
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_resident(stored)
    }
}

#[async_trait]
impl ResidentRepository for DieselResidentRepository {
    async fn insert(&self, draft: &ResidentDraft) -> Result<Resident, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        self.insert_on(&mut conn, draft).await
    }

    async fn insert_many(
        &self,
        drafts: &[ResidentDraft],
    ) -> Result<Vec<InsertOutcome>, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut batch = BulkInsert::new(drafts.len());

        for draft in drafts {
            let result = self.insert_on(&mut conn, draft).await;
            if batch.record(result)?.is_break() {
                break;
            }
        }

        Ok(batch.finish())
    }

    async fn find_all(&self) -> Result<Vec<Resident>, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ResidentRow> = residents::table
            .select(ResidentRow::as_select())
            .order((
                residents::updated_at.desc(),
                residents::created_at.desc(),
                residents::id.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_residents(rows)
    }

    async fn find_by_id(&self, id: &ResidentId) -> Result<Option<Resident>, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ResidentRow> = residents::table
            .find(*id.as_uuid())
            .select(ResidentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_resident).transpose()
    }

    async fn search(&self, filter: &ResidentSearch) -> Result<Vec<Resident>, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = residents::table
            .select(ResidentRow::as_select())
            .into_boxed();

        if let Some(section) = filter.section() {
            query = query.filter(residents::section.eq(section.to_owned()));
        }
        if let Some(location) = filter.location() {
            query = query
                .filter(residents::building.eq(location.building.clone()))
                .filter(residents::door.eq(location.door.clone()));
        }
        if let Some(car_plate) = filter.car_plate() {
            query = query.filter(residents::car_plate.eq(car_plate.to_owned()));
        }
        if let Some(permit_number) = filter.permit_number() {
            query = query.filter(residents::permit_number.eq(permit_number.to_owned()));
        }
        if let Some(fragment) = filter.full_name_fragment() {
            query = query.filter(residents::full_name.ilike(like_pattern(fragment)));
        }

        let rows: Vec<ResidentRow> = query
            .order((
                residents::updated_at.desc(),
                residents::created_at.desc(),
                residents::id.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_residents(rows)
    }

    async fn replace(
        &self,
        id: &ResidentId,
        draft: &ResidentDraft,
    ) -> Result<Resident, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ResidentChangeset::from_draft(draft, self.clock.utc());
        let row: Option<ResidentRow> = diesel::update(residents::table.find(*id.as_uuid()))
            .set(&changes)
            .returning(ResidentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_resident(row),
            None => Err(ResidentRepositoryError::not_found(*id)),
        }
    }

    async fn delete(&self, id: &ResidentId) -> Result<(), ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(residents::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UniqueField;
    use crate::test_support::{resident_draft, stored_resident};
    use rstest::rstest;

    fn inserted(plate: &str, permit: &str) -> Result<Resident, ResidentRepositoryError> {
        Ok(stored_resident(resident_draft("jane doe", plate, permit)))
    }

    fn lost() -> Result<Resident, ResidentRepositoryError> {
        Err(ResidentRepositoryError::connection("server closed the connection"))
    }

    #[rstest]
    fn bulk_insert_keeps_going_past_rejections() {
        let mut batch = BulkInsert::new(3);
        for result in [
            inserted("ab 1", "M1"),
            Err(ResidentRepositoryError::duplicate(UniqueField::CarPlate)),
            inserted("ab 2", "M2"),
        ] {
            assert!(batch.record(result).expect("no fatal error").is_continue());
        }

        let outcomes = batch.finish();
        assert_eq!(outcomes.iter().filter(|o| o.inserted().is_some()).count(), 2);
        assert_eq!(
            outcomes[1],
            InsertOutcome::Rejected(InsertRejection::Duplicate {
                field: UniqueField::CarPlate
            })
        );
    }

    #[rstest]
    fn query_failures_reject_only_their_record() {
        let mut batch = BulkInsert::new(2);
        let flow = batch
            .record(Err(ResidentRepositoryError::query("check violation")))
            .expect("not fatal");
        assert!(flow.is_continue());
        assert!(matches!(
            batch.finish().as_slice(),
            [InsertOutcome::Rejected(InsertRejection::Failed { .. })]
        ));
    }

    #[rstest]
    fn connection_loss_before_any_write_fails_the_batch() {
        let mut batch = BulkInsert::new(3);
        batch
            .record(Err(ResidentRepositoryError::duplicate(UniqueField::PermitNumber)))
            .expect("duplicate is not fatal");

        let err = batch.record(lost()).expect_err("nothing written yet");
        assert!(matches!(err, ResidentRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn connection_loss_after_a_write_fails_the_remaining_records() {
        let mut batch = BulkInsert::new(4);
        batch.record(inserted("ab 1", "M1")).expect("insert recorded");

        let flow = batch.record(lost()).expect("earlier write keeps the batch");
        assert!(flow.is_break());

        let outcomes = batch.finish();
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].inserted().is_some());
        assert!(outcomes[1..].iter().all(|outcome| matches!(
            outcome,
            InsertOutcome::Rejected(InsertRejection::Failed { .. })
        )));
    }

    #[rstest]
    #[case("doe", "%doe%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("back\\slash", "%back\\\\slash%")]
    fn like_pattern_escapes_metacharacters(#[case] fragment: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(fragment), expected);
    }

    #[rstest]
    fn row_with_blank_required_column_is_rejected() {
        let now = chrono::Utc::now();
        let row = ResidentRow {
            id: Uuid::nil(),
            full_name: String::new(),
            section: "GH1".to_owned(),
            building: "B".to_owned(),
            door: "12".to_owned(),
            car_plate: "ab 123".to_owned(),
            permit_number: "M1".to_owned(),
            phone_primary: "0600000000".to_owned(),
            phone_secondary: None,
            created_at: now,
            updated_at: now,
        };
        let err = row_to_resident(row).expect_err("blank name rejected");
        assert!(matches!(err, ResidentRepositoryError::Query { .. }));
    }
}
