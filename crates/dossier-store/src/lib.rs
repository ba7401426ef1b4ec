//! Dossier Storage Layer
//!
//! In-memory record store for application and verification records.
//!
//! # Architecture
//!
//! Records live in process memory only: the store is an explicit object
//! injected into the route layer, cloned cheaply via its inner `Arc`s, and
//! its contents do not survive a restart. This is the documented contract
//! of the service, not a stopgap; durability is out of scope.
//!
//! Updates are last-write-wins. A record's fields are only written by the
//! request thread that holds its id, so no conflict resolution beyond the
//! lock itself is required.
//!
//! # Examples
//!
//! ```
//! use dossier_store::RecordStore;
//! use dossier_domain::{ApplicationRecord, RecordId};
//! use std::collections::BTreeMap;
//!
//! let store = RecordStore::new();
//! let record = ApplicationRecord::new(RecordId::new(), BTreeMap::new());
//! let id = store.insert_application(record);
//! assert!(store.application(&id).is_some());
//! ```

#![warn(missing_docs)]

use dossier_domain::{ApplicationRecord, RecordId, VerificationRecord};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists under the given id
    #[error("Record not found: {0}")]
    NotFound(RecordId),
}

type Shared<T> = Arc<RwLock<HashMap<RecordId, T>>>;

/// In-memory store owning every application and verification record
///
/// Cloning the store clones the handles, not the records; all clones see
/// the same data.
#[derive(Clone, Default)]
pub struct RecordStore {
    applications: Shared<ApplicationRecord>,
    verifications: Shared<VerificationRecord>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an application record, returning its id
    pub fn insert_application(&self, record: ApplicationRecord) -> RecordId {
        let id = record.id;
        self.applications
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, record);
        id
    }

    /// Fetch a copy of an application record
    pub fn application(&self, id: &RecordId) -> Option<ApplicationRecord> {
        self.applications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Mutate an application record in place, refreshing `updated_at`
    ///
    /// Returns a copy of the record after the mutation.
    pub fn update_application<F>(
        &self,
        id: &RecordId,
        mutate: F,
    ) -> Result<ApplicationRecord, StoreError>
    where
        F: FnOnce(&mut ApplicationRecord),
    {
        let mut records = self
            .applications
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let record = records.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        mutate(record);
        record.touch();
        Ok(record.clone())
    }

    /// List all application records, oldest first
    pub fn applications(&self) -> Vec<ApplicationRecord> {
        let mut records: Vec<_> = self
            .applications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Insert a verification record, returning its id
    pub fn insert_verification(&self, record: VerificationRecord) -> RecordId {
        let id = record.id;
        self.verifications
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, record);
        id
    }

    /// Fetch a copy of a verification record
    pub fn verification(&self, id: &RecordId) -> Option<VerificationRecord> {
        self.verifications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Mutate a verification record in place, refreshing `updated_at`
    pub fn update_verification<F>(
        &self,
        id: &RecordId,
        mutate: F,
    ) -> Result<VerificationRecord, StoreError>
    where
        F: FnOnce(&mut VerificationRecord),
    {
        let mut records = self
            .verifications
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let record = records.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        mutate(record);
        record.touch();
        Ok(record.clone())
    }

    /// List all verification records, oldest first
    pub fn verifications(&self) -> Vec<VerificationRecord> {
        let mut records: Vec<_> = self
            .verifications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Remove every record of both kinds (bulk clear, test support)
    pub fn clear(&self) {
        self.applications
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.verifications
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of application records
    pub fn application_count(&self) -> usize {
        self.applications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of verification records
    pub fn verification_count(&self) -> usize {
        self.verifications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::{RecordStatus, UploadType};
    use std::collections::BTreeMap;

    fn application() -> ApplicationRecord {
        ApplicationRecord::new(RecordId::new(), BTreeMap::new())
    }

    #[test]
    fn test_insert_and_get() {
        let store = RecordStore::new();
        let id = store.insert_application(application());
        let fetched = store.application(&id).unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.status, RecordStatus::Uploaded);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = RecordStore::new();
        assert!(store.application(&RecordId::new()).is_none());
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let store = RecordStore::new();
        let id = store.insert_application(application());
        let before = store.application(&id).unwrap().updated_at;
        let after = store
            .update_application(&id, |r| r.begin_analysis())
            .unwrap();
        assert_eq!(after.status, RecordStatus::Analyzing);
        assert!(after.updated_at >= before);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = RecordStore::new();
        let result = store.update_application(&RecordId::new(), |r| r.begin_analysis());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_list_is_oldest_first() {
        let store = RecordStore::new();
        let first = store.insert_application(application());
        let second = store.insert_application(application());
        let listed = store.applications();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[1].id, second);
    }

    #[test]
    fn test_clones_share_contents() {
        let store = RecordStore::new();
        let clone = store.clone();
        let id = store.insert_application(application());
        assert!(clone.application(&id).is_some());
    }

    #[test]
    fn test_clear_removes_both_kinds() {
        let store = RecordStore::new();
        store.insert_application(application());
        store.insert_verification(VerificationRecord::new(
            RecordId::new(),
            BTreeMap::new(),
            UploadType::Single,
        ));
        store.clear();
        assert_eq!(store.application_count(), 0);
        assert_eq!(store.verification_count(), 0);
    }
}
