//! Record identifiers
//!
//! Users and blogs are keyed by UUIDs stored in their lowercase hyphenated
//! text form. Identifiers arriving from clients are parsed and normalized
//! before they reach the store; anything that is not a UUID is malformed.

use uuid::Uuid;

/// Generate a fresh identifier for a new record
pub fn new_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Parse a client-supplied identifier into its stored form.
///
/// Returns `None` when the input is not a syntactically valid identifier.
pub fn parse_id(raw: &str) -> Option<String> {
    Uuid::parse_str(raw.trim())
        .ok()
        .map(|id| id.hyphenated().to_string())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Strings that cannot be hex never parse as identifiers
        #[test]
        fn non_hex_strings_are_rejected(raw in "[g-z!@#$ ]{1,40}") {
            prop_assert!(parse_id(&raw).is_none());
        }

        /// Any UUID, in any case, normalizes to the same stored form
        #[test]
        fn uuids_normalize_to_lowercase(bytes in any::<[u8; 16]>()) {
            let uuid = Uuid::from_bytes(bytes);
            let upper = uuid.hyphenated().to_string().to_uppercase();
            prop_assert_eq!(parse_id(&upper), Some(uuid.hyphenated().to_string()));
        }
    }
}
