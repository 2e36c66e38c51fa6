//! Accepted shapes for bulk synchronisation pushes.

use serde_json::Value;

/// Field name used when a client wraps the batch in an object.
pub const WRAPPED_BATCH_KEY: &str = "residents";

/// A batch of raw candidate records pushed by a client.
///
/// Clients send either a bare JSON array or `{"residents": [...]}`. Both are
/// resolved once at the boundary; the synchroniser only sees candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPayload {
    /// `[ {...}, {...} ]`
    Bare(Vec<Value>),
    /// `{ "residents": [ {...}, {...} ] }`
    Wrapped(Vec<Value>),
}

/// The payload is neither an array nor a wrapper object holding one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sync payload must be an array or an object with a `residents` array")]
pub struct MalformedPayload;

impl SyncPayload {
    /// Borrow the candidate records.
    pub fn candidates(&self) -> &[Value] {
        match self {
            Self::Bare(items) | Self::Wrapped(items) => items,
        }
    }

    /// Take ownership of the candidate records.
    pub fn into_candidates(self) -> Vec<Value> {
        match self {
            Self::Bare(items) | Self::Wrapped(items) => items,
        }
    }
}

impl TryFrom<Value> for SyncPayload {
    type Error = MalformedPayload;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(Self::Bare(items)),
            Value::Object(mut map) => match map.remove(WRAPPED_BATCH_KEY) {
                Some(Value::Array(items)) => Ok(Self::Wrapped(items)),
                _ => Err(MalformedPayload),
            },
            _ => Err(MalformedPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn bare_array_is_accepted() {
        let payload = SyncPayload::try_from(json!([{ "carPlate": "a" }])).expect("bare array");
        assert!(matches!(payload, SyncPayload::Bare(_)));
        assert_eq!(payload.candidates().len(), 1);
    }

    #[rstest]
    fn wrapped_array_is_accepted() {
        let payload =
            SyncPayload::try_from(json!({ "residents": [{}, {}] })).expect("wrapped array");
        assert!(matches!(payload, SyncPayload::Wrapped(_)));
        assert_eq!(payload.into_candidates().len(), 2);
    }

    #[rstest]
    #[case(json!({ "records": [] }))]
    #[case(json!({ "residents": "nope" }))]
    #[case(json!("text"))]
    #[case(json!(null))]
    #[case(json!(3))]
    fn other_shapes_are_malformed(#[case] value: Value) {
        assert_eq!(SyncPayload::try_from(value), Err(MalformedPayload));
    }
}
