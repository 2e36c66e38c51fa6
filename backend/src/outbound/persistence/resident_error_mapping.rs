//! Diesel and pool error mapping for the resident repository.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::UniqueField;
use crate::domain::ports::{InsertRejection, ResidentRepositoryError};

use super::pool::PoolError;

/// Constraint guarding `residents.car_plate`.
pub(crate) const CAR_PLATE_CONSTRAINT: &str = "residents_car_plate_key";
/// Constraint guarding `residents.permit_number`.
pub(crate) const PERMIT_NUMBER_CONSTRAINT: &str = "residents_permit_number_key";

/// Map pool errors to repository connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> ResidentRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ResidentRepositoryError::connection(message)
        }
    }
}

/// Identify the uniqueness constraint behind a unique violation.
///
/// Falls back to the message text when the driver omits the constraint name.
pub(crate) fn unique_field_for(constraint: Option<&str>, message: &str) -> Option<UniqueField> {
    let mentions = |name: &str| constraint.is_some_and(|c| c == name) || message.contains(name);
    if mentions(CAR_PLATE_CONSTRAINT) {
        Some(UniqueField::CarPlate)
    } else if mentions(PERMIT_NUMBER_CONSTRAINT) {
        Some(UniqueField::PermitNumber)
    } else {
        None
    }
}

/// Map Diesel errors to repository errors.
pub(crate) fn map_diesel_error(error: DieselError) -> ResidentRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => ResidentRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => ResidentRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match unique_field_for(info.constraint_name(), info.message()) {
                Some(field) => ResidentRepositoryError::duplicate(field),
                None => {
                    warn!(
                        constraint_name = ?info.constraint_name(),
                        "unrecognised unique violation on residents"
                    );
                    ResidentRepositoryError::query("unique violation")
                }
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ResidentRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => ResidentRepositoryError::query("database error"),
        _ => ResidentRepositoryError::query("database error"),
    }
}

/// Classify the failure of one record in a bulk insert.
///
/// Connection failures stay errors so the caller can decide whether the batch
/// as a whole failed; everything else becomes a per-record rejection.
pub(crate) fn insert_rejection(
    error: ResidentRepositoryError,
) -> Result<InsertRejection, ResidentRepositoryError> {
    match error {
        ResidentRepositoryError::Duplicate { field } => Ok(InsertRejection::Duplicate { field }),
        ResidentRepositoryError::Connection { .. } => Err(error),
        other => Ok(InsertRejection::Failed {
            message: other.to_string(),
        }),
    }
}
