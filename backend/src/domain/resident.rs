//! Resident record model.
//!
//! A [`ResidentDraft`] holds validated, normalised attributes that have not
//! yet been persisted. A [`Resident`] is a stored record: a draft plus the
//! store-assigned identifier and audit timestamps.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Resident attributes addressed by clients, with their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidentField {
    FullName,
    Section,
    Building,
    Door,
    CarPlate,
    PermitNumber,
    PhonePrimary,
    PhoneSecondary,
}

impl ResidentField {
    /// Canonical camelCase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Section => "section",
            Self::Building => "building",
            Self::Door => "door",
            Self::CarPlate => "carPlate",
            Self::PermitNumber => "permitNumber",
            Self::PhonePrimary => "phonePrimary",
            Self::PhoneSecondary => "phoneSecondary",
        }
    }

    /// Wire names accepted on input, canonical name first.
    ///
    /// Older mobile builds still send `doorNumber` and `numeroDeMacaron`.
    pub fn input_keys(self) -> &'static [&'static str] {
        match self {
            Self::FullName => &["fullName"],
            Self::Section => &["section"],
            Self::Building => &["building"],
            Self::Door => &["door", "doorNumber"],
            Self::CarPlate => &["carPlate"],
            Self::PermitNumber => &["permitNumber", "numeroDeMacaron"],
            Self::PhonePrimary => &["phonePrimary"],
            Self::PhoneSecondary => &["phoneSecondary"],
        }
    }

    /// Whether values are case-folded during normalisation.
    pub fn is_case_folded(self) -> bool {
        matches!(self, Self::FullName | Self::CarPlate)
    }
}

impl fmt::Display for ResidentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes that must be unique across all residents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    CarPlate,
    PermitNumber,
}

impl UniqueField {
    /// The resident attribute guarded by this constraint.
    pub fn field(self) -> ResidentField {
        match self {
            Self::CarPlate => ResidentField::CarPlate,
            Self::PermitNumber => ResidentField::PermitNumber,
        }
    }

    /// Camel-case wire name of the guarded attribute.
    pub fn as_str(self) -> &'static str {
        self.field().as_str()
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors raised while building residents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResidentValidationError {
    /// A required attribute is empty after normalisation.
    #[error("{field} must not be empty")]
    EmptyField { field: ResidentField },
    /// The identifier is not a UUID.
    #[error("resident id must be a valid UUID")]
    InvalidId,
}

impl ResidentValidationError {
    /// The offending attribute, when the error concerns one.
    pub fn field(&self) -> Option<ResidentField> {
        match self {
            Self::EmptyField { field } => Some(*field),
            Self::InvalidId => None,
        }
    }
}

/// Stable resident identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidentId(Uuid);

impl ResidentId {
    /// Parse an identifier from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ResidentValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(ResidentValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ResidentValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plain resident attributes before validation.
///
/// Produced by the normaliser; every value is already trimmed and, where
/// applicable, case-folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentFields {
    pub full_name: String,
    pub section: String,
    pub building: String,
    pub door: String,
    pub car_plate: String,
    pub permit_number: String,
    pub phone_primary: String,
    pub phone_secondary: Option<String>,
}

/// Validated resident attributes ready for persistence.
///
/// ## Invariants
/// - Every required attribute is non-empty.
/// - `phone_secondary` is either absent or non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentDraft {
    full_name: String,
    section: String,
    building: String,
    door: String,
    car_plate: String,
    permit_number: String,
    phone_primary: String,
    phone_secondary: Option<String>,
}

fn require(field: ResidentField, value: String) -> Result<String, ResidentValidationError> {
    if value.trim().is_empty() {
        Err(ResidentValidationError::EmptyField { field })
    } else {
        Ok(value)
    }
}

impl TryFrom<ResidentFields> for ResidentDraft {
    type Error = ResidentValidationError;

    fn try_from(value: ResidentFields) -> Result<Self, Self::Error> {
        let ResidentFields {
            full_name,
            section,
            building,
            door,
            car_plate,
            permit_number,
            phone_primary,
            phone_secondary,
        } = value;

        Ok(Self {
            full_name: require(ResidentField::FullName, full_name)?,
            section: require(ResidentField::Section, section)?,
            building: require(ResidentField::Building, building)?,
            door: require(ResidentField::Door, door)?,
            car_plate: require(ResidentField::CarPlate, car_plate)?,
            permit_number: require(ResidentField::PermitNumber, permit_number)?,
            phone_primary: require(ResidentField::PhonePrimary, phone_primary)?,
            phone_secondary: phone_secondary.filter(|phone| !phone.trim().is_empty()),
        })
    }
}

impl ResidentDraft {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn building(&self) -> &str {
        &self.building
    }

    pub fn door(&self) -> &str {
        &self.door
    }

    pub fn car_plate(&self) -> &str {
        &self.car_plate
    }

    pub fn permit_number(&self) -> &str {
        &self.permit_number
    }

    pub fn phone_primary(&self) -> &str {
        &self.phone_primary
    }

    pub fn phone_secondary(&self) -> Option<&str> {
        self.phone_secondary.as_deref()
    }

    /// Value guarded by the given uniqueness constraint.
    pub fn unique_value(&self, field: UniqueField) -> &str {
        match field {
            UniqueField::CarPlate => &self.car_plate,
            UniqueField::PermitNumber => &self.permit_number,
        }
    }

    /// Apply a partial update and re-validate the result.
    pub fn apply(&self, patch: &ResidentPatch) -> Result<Self, ResidentValidationError> {
        let pick = |update: &Option<String>, current: &str| {
            update.clone().unwrap_or_else(|| current.to_owned())
        };
        let phone_secondary = match &patch.phone_secondary {
            Some(update) => update.clone(),
            None => self.phone_secondary.clone(),
        };

        Self::try_from(ResidentFields {
            full_name: pick(&patch.full_name, &self.full_name),
            section: pick(&patch.section, &self.section),
            building: pick(&patch.building, &self.building),
            door: pick(&patch.door, &self.door),
            car_plate: pick(&patch.car_plate, &self.car_plate),
            permit_number: pick(&patch.permit_number, &self.permit_number),
            phone_primary: pick(&patch.phone_primary, &self.phone_primary),
            phone_secondary,
        })
    }
}

/// Partial update for a stored resident.
///
/// `None` leaves an attribute untouched. `phone_secondary: Some(None)`
/// clears the optional phone number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentPatch {
    pub full_name: Option<String>,
    pub section: Option<String>,
    pub building: Option<String>,
    pub door: Option<String>,
    pub car_plate: Option<String>,
    pub permit_number: Option<String>,
    pub phone_primary: Option<String>,
    pub phone_secondary: Option<Option<String>>,
}

impl ResidentPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A persisted resident record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resident {
    id: ResidentId,
    draft: ResidentDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Resident {
    /// Assemble a stored record from its parts.
    pub fn new(
        id: ResidentId,
        draft: ResidentDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            draft,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ResidentId {
        &self.id
    }

    /// Validated attributes of the record.
    pub fn draft(&self) -> &ResidentDraft {
        &self.draft
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the attributes and bump the modification timestamp.
    pub fn revise(self, draft: ResidentDraft, updated_at: DateTime<Utc>) -> Self {
        Self {
            draft,
            updated_at,
            ..self
        }
    }
}
