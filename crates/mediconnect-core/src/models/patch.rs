//! Three-state field patch for sparse updates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A patch slot for a nullable field.
///
/// Distinguishes "leave the field unchanged" from "clear the field", which a
/// plain `Option` cannot. In JSON a missing key is `Keep`, an explicit
/// `null` is `Clear`, and any other value is `Set`. Fields using this type
/// must carry `#[serde(default, skip_serializing_if = "Patch::is_keep")]`
/// so the missing-key state survives a round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Field absent from the payload; the existing value is kept.
    #[default]
    Keep,
    /// Field explicitly cleared to absent.
    Clear,
    /// Field replaced with a new value.
    Set(T),
}

impl<T> Patch<T> {
    /// Apply this patch to a nullable slot.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }

    /// True when the patch leaves the field untouched.
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Borrow the set value, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Keep is representable only as a missing key; skip_serializing_if
            // handles that, and a forced serialization degrades to null.
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        #[serde(default, skip_serializing_if = "Patch::is_keep")]
        email: Patch<String>,
    }

    #[test]
    fn test_missing_key_is_keep() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.email, Patch::Keep);
    }

    #[test]
    fn test_null_is_clear() {
        let payload: Payload = serde_json::from_str(r#"{"email":null}"#).unwrap();
        assert_eq!(payload.email, Patch::Clear);
    }

    #[test]
    fn test_value_is_set() {
        let payload: Payload = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(payload.email, Patch::Set("a@b.co".into()));
    }

    #[test]
    fn test_serialize_round_trip() {
        let keep = serde_json::to_string(&Payload { email: Patch::Keep }).unwrap();
        assert_eq!(keep, "{}");

        let clear = serde_json::to_string(&Payload { email: Patch::Clear }).unwrap();
        assert_eq!(clear, r#"{"email":null}"#);

        let set = serde_json::to_string(&Payload {
            email: Patch::Set("a@b.co".into()),
        })
        .unwrap();
        assert_eq!(set, r#"{"email":"a@b.co"}"#);
    }

    #[test]
    fn test_apply() {
        let mut slot = Some("old".to_string());
        Patch::Keep.apply(&mut slot);
        assert_eq!(slot.as_deref(), Some("old"));

        Patch::Set("new".to_string()).apply(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));

        Patch::<String>::Clear.apply(&mut slot);
        assert_eq!(slot, None);
    }
}
