use std::path::Path;

use nong_core::StoreError;
use nong_model::{PartnerId, Preference, RegistrantId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Stores that can be populated with registrants and partners.
pub trait SeedTarget {
    fn insert_registrant(
        &self,
        id: &RegistrantId,
        preference: Preference,
    ) -> Result<(), StoreError>;
    fn insert_partner(&self, id: &PartnerId) -> Result<(), StoreError>;
}

/// One registrant entry of a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRegistrant {
    pub id: RegistrantId,
    #[serde(default)]
    pub preference: Preference,
}

/// Initial population of a store, usually loaded from JSON.
///
/// ```json
/// {
///   "partners": ["f-1", "f-2"],
///   "registrants": [{ "id": "s-1", "preference": "prefers-two" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub partners: Vec<PartnerId>,
    pub registrants: Vec<SeedRegistrant>,
}

impl Seed {
    /// Parse a seed from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Backend(format!("failed to read seed `{}`: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            StoreError::Backend(format!("invalid seed `{}`: {e}", path.display()))
        })
    }

    /// Insert every partner and registrant into `target`.
    pub fn apply<T: SeedTarget + ?Sized>(&self, target: &T) -> Result<(), StoreError> {
        for partner in &self.partners {
            target.insert_partner(partner)?;
        }
        for r in &self.registrants {
            target.insert_registrant(&r.id, r.preference)?;
        }
        info!(
            partners = self.partners.len(),
            registrants = self.registrants.len(),
            "store seeded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use nong_core::AssignmentStore;

    #[test]
    fn parses_json_with_default_preference() {
        let seed: Seed = serde_json::from_str(
            r#"{
                "partners": ["f-1"],
                "registrants": [{"id": "s-1"}, {"id": "s-2", "preference": "prefers-two"}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.partners, vec![PartnerId::from("f-1")]);
        assert_eq!(seed.registrants[0].preference, Preference::Neutral);
        assert_eq!(seed.registrants[1].preference, Preference::PrefersTwo);
    }

    #[tokio::test]
    async fn apply_populates_store() {
        let seed = Seed {
            partners: vec!["f-1".into(), "f-2".into()],
            registrants: vec![SeedRegistrant {
                id: "s-1".into(),
                preference: Preference::DeclinesTwo,
            }],
        };
        let store = MemoryStore::new();
        seed.apply(&store).unwrap();

        assert_eq!(store.read_unassigned_partners().await.unwrap().len(), 2);
        assert_eq!(
            store.read_registrant_preference(&"s-1".into()).await.unwrap(),
            Some(Preference::DeclinesTwo)
        );
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Seed::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("failed to read seed"));
    }
}
