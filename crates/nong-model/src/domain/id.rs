use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Opaque identifier of a registrant (the sophomore asking for partners).
    RegistrantId
}

string_id! {
    /// Opaque identifier of a partner identity drawn from the shared pool.
    PartnerId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_string() {
        let id = RegistrantId::new("s-001");
        assert_eq!(id.to_string(), "s-001");
        assert_eq!(id.as_str(), "s-001");
    }

    #[test]
    fn serde_is_transparent() {
        let id = PartnerId::from("f-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"f-42\"");

        let back: PartnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_order_lexicographically() {
        let mut ids = vec![PartnerId::from("b"), PartnerId::from("a")];
        ids.sort();
        assert_eq!(ids, vec![PartnerId::from("a"), PartnerId::from("b")]);
    }
}
