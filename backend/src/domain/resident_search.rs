//! Resident search filter.
//!
//! Filters combine with logical AND. `building` and `door` only apply
//! together; a lone building or door is ignored rather than applied.

use super::{Resident, ResidentField, normalise_text};

/// Raw search inputs as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentSearchParams {
    pub section: Option<String>,
    pub building: Option<String>,
    pub door: Option<String>,
    pub car_plate: Option<String>,
    pub permit_number: Option<String>,
    pub full_name: Option<String>,
}

/// Exact building and door pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub building: String,
    pub door: String,
}

/// Normalised search filter.
///
/// Values go through the same normalisation as stored records, so a plate
/// typed as `AB 123` matches a resident stored as `ab 123`. Blank values
/// impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentSearch {
    section: Option<String>,
    location: Option<Location>,
    car_plate: Option<String>,
    permit_number: Option<String>,
    full_name: Option<String>,
}

fn normalised(field: ResidentField, value: Option<String>) -> Option<String> {
    value
        .map(|raw| normalise_text(field, &raw))
        .filter(|text| !text.is_empty())
}

impl From<ResidentSearchParams> for ResidentSearch {
    fn from(params: ResidentSearchParams) -> Self {
        let building = normalised(ResidentField::Building, params.building);
        let door = normalised(ResidentField::Door, params.door);
        let location = match (building, door) {
            (Some(building), Some(door)) => Some(Location { building, door }),
            _ => None,
        };

        Self {
            section: normalised(ResidentField::Section, params.section),
            location,
            car_plate: normalised(ResidentField::CarPlate, params.car_plate),
            permit_number: normalised(ResidentField::PermitNumber, params.permit_number),
            full_name: normalised(ResidentField::FullName, params.full_name),
        }
    }
}

impl ResidentSearch {
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn car_plate(&self) -> Option<&str> {
        self.car_plate.as_deref()
    }

    pub fn permit_number(&self) -> Option<&str> {
        self.permit_number.as_deref()
    }

    /// Lowercased name fragment matched as a substring.
    pub fn full_name_fragment(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// True when no constraint applies.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate the filter against a stored resident.
    pub fn matches(&self, resident: &Resident) -> bool {
        let draft = resident.draft();
        let exact = |wanted: Option<&str>, actual: &str| wanted.is_none_or(|value| value == actual);

        exact(self.section(), draft.section())
            && self.location().is_none_or(|location| {
                location.building == draft.building() && location.door == draft.door()
            })
            && exact(self.car_plate(), draft.car_plate())
            && exact(self.permit_number(), draft.permit_number())
            && self.full_name_fragment().is_none_or(|fragment| {
                draft.full_name().to_lowercase().contains(fragment)
            })
    }
}
