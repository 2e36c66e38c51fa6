//! Bulk resident synchronisation.
//!
//! Each candidate is normalised and validated independently. Candidates
//! that fail validation are rejected here; the rest go to the store in a
//! single unordered bulk insert, so one bad or duplicate record never stops
//! the others. The report counts exactly what the store confirmed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    InsertOutcome, InsertRejection, RejectedCandidate, ResidentRepository, ResidentSyncCommand,
    ResidentSyncReport, SyncRejection,
};
use crate::domain::resident_service::map_repository_error;
use crate::domain::{Error, ResidentDraft, ResidentValidationError, SyncPayload, normalise_value};

/// Synchronisation service implementing [`ResidentSyncCommand`].
#[derive(Clone)]
pub struct ResidentSyncService<R> {
    repo: Arc<R>,
}

impl<R> ResidentSyncService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn rejection_for_invalid(index: usize, error: ResidentValidationError) -> RejectedCandidate {
    let reason = match error.field() {
        Some(field) => SyncRejection::Invalid { field },
        None => SyncRejection::Failed {
            message: error.to_string(),
        },
    };
    RejectedCandidate { index, reason }
}

fn rejection_from_store(index: usize, rejection: InsertRejection) -> RejectedCandidate {
    let reason = match rejection {
        InsertRejection::Duplicate { field } => SyncRejection::Duplicate { field },
        InsertRejection::Failed { message } => SyncRejection::Failed { message },
    };
    RejectedCandidate { index, reason }
}

#[async_trait]
impl<R> ResidentSyncCommand for ResidentSyncService<R>
where
    R: ResidentRepository,
{
    async fn sync(&self, payload: SyncPayload) -> Result<ResidentSyncReport, Error> {
        let candidates = payload.into_candidates();
        let batch_size = candidates.len();

        let mut report = ResidentSyncReport::default();
        let mut drafts = Vec::with_capacity(batch_size);
        let mut positions = Vec::with_capacity(batch_size);
        for (index, candidate) in candidates.iter().enumerate() {
            match ResidentDraft::try_from(normalise_value(candidate)) {
                Ok(draft) => {
                    drafts.push(draft);
                    positions.push(index);
                }
                Err(error) => report.rejected.push(rejection_for_invalid(index, error)),
            }
        }

        if !drafts.is_empty() {
            let outcomes = self
                .repo
                .insert_many(&drafts)
                .await
                .map_err(map_repository_error)?;
            if outcomes.len() != drafts.len() {
                return Err(Error::internal(format!(
                    "resident store reported {} outcomes for {} records",
                    outcomes.len(),
                    drafts.len()
                )));
            }

            for (index, outcome) in positions.into_iter().zip(outcomes) {
                match outcome {
                    InsertOutcome::Inserted(resident) => report.inserted.push(resident),
                    InsertOutcome::Rejected(rejection) => {
                        report.rejected.push(rejection_from_store(index, rejection));
                    }
                }
            }
            report.rejected.sort_by_key(|rejected| rejected.index);
        }

        for rejected in &report.rejected {
            tracing::debug!(index = rejected.index, reason = ?rejected.reason, "sync candidate rejected");
        }
        tracing::info!(
            batch_size,
            inserted_count = report.inserted_count(),
            rejected_count = report.rejected_count(),
            "resident sync completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::ports::{MockResidentRepository, ResidentRepositoryError};
    use crate::domain::{ErrorCode, ResidentField, UniqueField};
    use crate::test_support::stored_resident;

    fn payload(value: serde_json::Value) -> SyncPayload {
        SyncPayload::try_from(value).expect("valid payload")
    }

    fn make_service(repo: MockResidentRepository) -> ResidentSyncService<MockResidentRepository> {
        ResidentSyncService::new(Arc::new(repo))
    }

    fn candidate(plate: &str, permit: &str) -> serde_json::Value {
        json!({
            "fullName": "Jane Doe",
            "section": "GH1",
            "building": "B",
            "door": "12",
            "carPlate": plate,
            "permitNumber": permit,
            "phonePrimary": "0600000000",
        })
    }

    #[tokio::test]
    async fn counts_exactly_what_the_store_inserted() {
        let mut repo = MockResidentRepository::new();
        repo.expect_insert_many().times(1).returning(|drafts| {
            Ok(vec![
                InsertOutcome::Inserted(stored_resident(drafts[0].clone())),
                InsertOutcome::Rejected(InsertRejection::Duplicate {
                    field: UniqueField::CarPlate,
                }),
            ])
        });

        let report = make_service(repo)
            .sync(payload(json!([candidate("NEW-1", "M10"), candidate("AB 123", "M11")])))
            .await
            .expect("sync succeeds");

        assert_eq!(report.inserted_count(), 1);
        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.inserted[0].draft().car_plate(), "new-1");
        assert_eq!(
            report.rejected[0],
            RejectedCandidate {
                index: 1,
                reason: SyncRejection::Duplicate {
                    field: UniqueField::CarPlate
                },
            }
        );
    }

    #[tokio::test]
    async fn invalid_candidates_never_reach_the_store() {
        let mut repo = MockResidentRepository::new();
        repo.expect_insert_many()
            .withf(|drafts| drafts.len() == 1 && drafts[0].permit_number() == "M2")
            .times(1)
            .returning(|drafts| {
                Ok(vec![InsertOutcome::Inserted(stored_resident(
                    drafts[0].clone(),
                ))])
            });

        let mut missing_section = candidate("p1", "M1");
        missing_section["section"] = json!("   ");
        let report = make_service(repo)
            .sync(payload(json!({
                "residents": [missing_section, candidate("p2", "M2"), "garbage"]
            })))
            .await
            .expect("sync succeeds");

        assert_eq!(report.inserted_count(), 1);
        assert_eq!(
            report.rejected,
            vec![
                RejectedCandidate {
                    index: 0,
                    reason: SyncRejection::Invalid {
                        field: ResidentField::Section
                    },
                },
                RejectedCandidate {
                    index: 2,
                    reason: SyncRejection::Invalid {
                        field: ResidentField::FullName
                    },
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_batch_skips_the_store() {
        let mut repo = MockResidentRepository::new();
        repo.expect_insert_many().never();

        let report = make_service(repo)
            .sync(payload(json!([])))
            .await
            .expect("sync succeeds");
        assert_eq!(report, ResidentSyncReport::default());
    }

    #[tokio::test]
    async fn unreachable_store_fails_the_push() {
        let mut repo = MockResidentRepository::new();
        repo.expect_insert_many()
            .times(1)
            .return_once(|_| Err(ResidentRepositoryError::connection("refused")));

        let error = make_service(repo)
            .sync(payload(json!([candidate("p1", "M1")])))
            .await
            .expect_err("push fails");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn mismatched_outcome_count_is_internal() {
        let mut repo = MockResidentRepository::new();
        repo.expect_insert_many()
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let error = make_service(repo)
            .sync(payload(json!([candidate("p1", "M1")])))
            .await
            .expect_err("inconsistent store");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
