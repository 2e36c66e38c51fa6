//! Normalisation of loosely typed resident payloads.
//!
//! Clients (notably the offline-capable mobile app) send resident records as
//! free-form JSON objects. Normalisation is total: every expected attribute is
//! coerced to text, trimmed, and `fullName`/`carPlate` are lowercased so that
//! uniqueness checks and searches are case-insensitive. Missing values become
//! empty strings; rejecting them is left to [`ResidentDraft`] validation.
//!
//! [`ResidentDraft`]: super::ResidentDraft

use serde_json::{Map, Value};

use super::{ResidentField, ResidentFields, ResidentPatch};

/// Coerce a JSON value to trimmed text.
///
/// Strings are trimmed, numbers and booleans use their textual form, and
/// `null`, arrays and objects become the empty string.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Normalise a single attribute value.
///
/// # Examples
/// ```
/// use resident_directory::domain::{ResidentField, normalise_text};
///
/// assert_eq!(normalise_text(ResidentField::CarPlate, "  AB 123 "), "ab 123");
/// assert_eq!(normalise_text(ResidentField::Section, " GH1 "), "GH1");
/// ```
pub fn normalise_text(field: ResidentField, raw: &str) -> String {
    let trimmed = raw.trim();
    if field.is_case_folded() {
        trimmed.to_lowercase()
    } else {
        trimmed.to_owned()
    }
}

/// First non-null value stored under any of the attribute's input keys.
fn lookup<'a>(raw: &'a Map<String, Value>, field: ResidentField) -> Option<&'a Value> {
    field
        .input_keys()
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

fn normalised(raw: &Map<String, Value>, field: ResidentField) -> String {
    lookup(raw, field)
        .map(|value| normalise_text(field, &coerce_text(value)))
        .unwrap_or_default()
}

/// Normalise a candidate record. Never fails.
///
/// # Examples
/// ```
/// use resident_directory::domain::normalise_candidate;
/// use serde_json::json;
///
/// let raw = json!({ "fullName": " Jane DOE ", "carPlate": "AB 123", "door": 12 });
/// let fields = normalise_candidate(raw.as_object().expect("object"));
/// assert_eq!(fields.full_name, "jane doe");
/// assert_eq!(fields.car_plate, "ab 123");
/// assert_eq!(fields.door, "12");
/// assert_eq!(fields.section, "");
/// ```
pub fn normalise_candidate(raw: &Map<String, Value>) -> ResidentFields {
    let phone_secondary = normalised(raw, ResidentField::PhoneSecondary);
    ResidentFields {
        full_name: normalised(raw, ResidentField::FullName),
        section: normalised(raw, ResidentField::Section),
        building: normalised(raw, ResidentField::Building),
        door: normalised(raw, ResidentField::Door),
        car_plate: normalised(raw, ResidentField::CarPlate),
        permit_number: normalised(raw, ResidentField::PermitNumber),
        phone_primary: normalised(raw, ResidentField::PhonePrimary),
        phone_secondary: (!phone_secondary.is_empty()).then_some(phone_secondary),
    }
}

/// Normalise any JSON value as a candidate; non-objects yield empty fields.
pub fn normalise_value(raw: &Value) -> ResidentFields {
    raw.as_object()
        .map(normalise_candidate)
        .unwrap_or_default()
}

/// Normalise a partial update, keeping only the attributes that are present.
///
/// An explicit `null` or blank `phoneSecondary` clears the optional phone.
/// Explicit `null` for a required attribute is kept as an empty update so
/// validation reports it instead of silently ignoring it.
pub fn normalise_patch(raw: &Map<String, Value>) -> ResidentPatch {
    let present = |field: ResidentField| {
        field
            .input_keys()
            .iter()
            .find_map(|key| raw.get(*key))
            .map(|value| normalise_text(field, &coerce_text(value)))
    };

    ResidentPatch {
        full_name: present(ResidentField::FullName),
        section: present(ResidentField::Section),
        building: present(ResidentField::Building),
        door: present(ResidentField::Door),
        car_plate: present(ResidentField::CarPlate),
        permit_number: present(ResidentField::PermitNumber),
        phone_primary: present(ResidentField::PhonePrimary),
        phone_secondary: present(ResidentField::PhoneSecondary)
            .map(|phone| (!phone.is_empty()).then_some(phone)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    fn trims_every_field_and_folds_name_and_plate() {
        let raw = object(json!({
            "fullName": "  Jane DOE ",
            "section": " GH1 ",
            "building": " B",
            "door": "12 ",
            "carPlate": " AB-123 ",
            "permitNumber": " M1 ",
            "phonePrimary": " 0600000000 ",
            "phoneSecondary": "  ",
        }));

        let fields = normalise_candidate(&raw);
        assert_eq!(
            fields,
            ResidentFields {
                full_name: "jane doe".to_owned(),
                section: "GH1".to_owned(),
                building: "B".to_owned(),
                door: "12".to_owned(),
                car_plate: "ab-123".to_owned(),
                permit_number: "M1".to_owned(),
                phone_primary: "0600000000".to_owned(),
                phone_secondary: None,
            }
        );
    }

    #[rstest]
    #[case(json!(null), "")]
    #[case(json!(42), "42")]
    #[case(json!(true), "true")]
    #[case(json!(["a"]), "")]
    #[case(json!({ "a": 1 }), "")]
    #[case(json!("  x  "), "x")]
    fn coerces_json_values_to_text(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(coerce_text(&value), expected);
    }

    #[rstest]
    fn accepts_legacy_aliases() {
        let raw = object(json!({ "doorNumber": "7", "numeroDeMacaron": "M9" }));
        let fields = normalise_candidate(&raw);
        assert_eq!(fields.door, "7");
        assert_eq!(fields.permit_number, "M9");
    }

    #[rstest]
    fn canonical_key_wins_over_alias() {
        let raw = object(json!({ "permitNumber": "M1", "numeroDeMacaron": "M9" }));
        assert_eq!(normalise_candidate(&raw).permit_number, "M1");
    }

    #[rstest]
    fn non_object_candidates_normalise_to_empty_fields() {
        assert_eq!(normalise_value(&json!("nope")), ResidentFields::default());
    }

    #[rstest]
    fn patch_keeps_only_present_fields() {
        let raw = object(json!({ "carPlate": " XY 9 ", "phoneSecondary": null }));
        let patch = normalise_patch(&raw);
        assert_eq!(patch.car_plate.as_deref(), Some("xy 9"));
        assert_eq!(patch.phone_secondary, Some(None));
        assert!(patch.full_name.is_none());
        assert!(patch.door.is_none());
    }

    #[rstest]
    fn empty_patch_is_detected() {
        assert!(normalise_patch(&Map::new()).is_empty());
    }
}
