//! Identifier newtypes
//!
//! All ids are stable strings. Entity ids are generated once at creation and
//! never reused; criteria and cycle ids come from the external accreditation
//! catalogue and are treated as opaque.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a tracked document or evidence file.
    EntityId
);

string_id!(
    /// Identifier of an acting user or unit (owner, reviewer).
    ActorId
);

string_id!(
    /// Accreditation criterion identifier (e.g. "K2").
    CriteriaId
);

string_id!(
    /// Accreditation review cycle identifier (e.g. "2024").
    CycleId
);

string_id!(
    /// Opaque content-addressed reference into the evidence store.
    ContentRef
);

impl EntityId {
    /// Generate a fresh entity id (`DOC-` prefix, short uuid tail).
    pub fn generate() -> Self {
        Self(format!(
            "DOC-{}",
            uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_entity_ids_are_unique() {
        let a = EntityId::generate();
        let b = EntityId::generate();

        assert!(a.as_str().starts_with("DOC-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = CriteriaId::new("K2");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"K2\"");

        let parsed: CriteriaId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_display_round_trip() {
        let actor = ActorId::from("coordinator-01");
        assert_eq!(actor.to_string(), "coordinator-01");
    }
}
