//! Volatile in-memory store.

use std::collections::HashMap;

use super::{PatientStore, StoreResult};
use crate::models::Patient;

/// Process-lifetime map store, the stand-in for a managed backend database.
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, Patient>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PatientStore for MemoryStore {
    fn insert(&mut self, patient: Patient) -> StoreResult<()> {
        self.records.insert(patient.id.clone(), patient);
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.records.get(id).cloned())
    }

    fn replace(&mut self, patient: Patient) -> StoreResult<bool> {
        match self.records.get_mut(&patient.id) {
            Some(slot) => {
                *slot = patient;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&mut self, id: &str) -> StoreResult<bool> {
        Ok(self.records.remove(id).is_some())
    }

    fn all(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.records.values().cloned().collect())
    }
}
