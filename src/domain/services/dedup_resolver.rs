//! Identity-keyed dedup decisions.
//!
//! Pure pairing functions between a freshly extracted entity and the
//! store's current record at the same identity key. No I/O happens here,
//! which is what makes the policy testable against synthetic before/after
//! states without a live store.

use crate::domain::models::{content_digest, ImportReference, SourceConstruct};

/// Outcome of pairing an extracted entity with the stored record at its
/// identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No record at the key: write a fresh one,
    /// `created_at = updated_at = now`.
    Insert,
    /// A record exists and must be rewritten: `updated_at = now`,
    /// `created_at` preserved. For constructs this also clears the stored
    /// embedding so it is recomputed downstream.
    UpdateExisting,
    /// The stored record already matches byte-for-byte: no write, and the
    /// existing embedding is kept. This is what keeps repeated runs from
    /// re-embedding unchanged code.
    NoOp,
}

/// Decide what to do with an extracted construct given the store's record
/// at the same (filename, line_start, line_end) key.
pub fn resolve_construct(
    existing: Option<&SourceConstruct>,
    incoming_code: &str,
) -> Resolution {
    match existing {
        None => Resolution::Insert,
        Some(stored) if content_digest(stored.code()) == content_digest(incoming_code) => {
            Resolution::NoOp
        }
        Some(_) => Resolution::UpdateExisting,
    }
}

/// Decide what to do with an extracted import given the store's record at
/// the same (filename, module_name) key. Imports carry no body to compare,
/// so re-observation always refreshes `updated_at`.
pub fn resolve_import(existing: Option<&ImportReference>) -> Resolution {
    match existing {
        None => Resolution::Insert,
        Some(_) => Resolution::UpdateExisting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ConstructKind, ImportType};

    fn stored_construct(code: &str) -> SourceConstruct {
        SourceConstruct::new(
            "src/app.py".to_string(),
            "c0ffee".to_string(),
            ConstructKind::Function,
            "handler".to_string(),
            5,
            14,
            code.to_string(),
        )
    }

    #[test]
    fn test_missing_record_resolves_to_insert() {
        assert_eq!(
            resolve_construct(None, "def handler():\n    pass"),
            Resolution::Insert
        );
    }

    #[test]
    fn test_identical_code_resolves_to_noop() {
        let stored = stored_construct("def handler():\n    pass");
        assert_eq!(
            resolve_construct(Some(&stored), "def handler():\n    pass"),
            Resolution::NoOp
        );
    }

    #[test]
    fn test_changed_code_resolves_to_update() {
        let stored = stored_construct("def handler():\n    pass");
        assert_eq!(
            resolve_construct(Some(&stored), "def handler():\n    return 42"),
            Resolution::UpdateExisting
        );
    }

    #[test]
    fn test_whitespace_change_is_a_change() {
        let stored = stored_construct("def handler():\n    pass");
        assert_eq!(
            resolve_construct(Some(&stored), "def handler():\n        pass"),
            Resolution::UpdateExisting
        );
    }

    #[test]
    fn test_missing_import_resolves_to_insert() {
        assert_eq!(resolve_import(None), Resolution::Insert);
    }

    #[test]
    fn test_existing_import_always_refreshes() {
        let stored = ImportReference::new(
            "src/app.py".to_string(),
            "demo".to_string(),
            "os".to_string(),
            ImportType::Direct,
        );
        assert_eq!(resolve_import(Some(&stored)), Resolution::UpdateExisting);
    }
}
