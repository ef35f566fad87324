//! Patient repository.
//!
//! CRUD access to patient records over a pluggable [`PatientStore`]:
//! listing with search, creation-time ordering and pagination, lookup by
//! id, creation with system-assigned identity, sparse merge updates, and
//! idempotent deletion.
//!
//! The repository trusts its caller to have run [`crate::validate`] on
//! incoming payloads, but always canonicalizes identifier fields
//! digits-only on write so the storage invariant holds regardless.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{NewPatient, Patch, Patient, PatientUpdate};
use crate::normalize;
use crate::store::{MemoryStore, PatientStore, StoreError};

/// Repository failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Update targeting an id that is not in the store.
    #[error("no patient with id {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Query window for [`PatientRepository::list`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page number; 0 is treated as 1.
    pub page: usize,
    /// Records per page.
    pub page_size: usize,
    /// Free-text search term; empty matches everything.
    pub search: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            search: String::new(),
        }
    }
}

impl ListQuery {
    /// Query for a specific page with the default page size.
    pub fn page(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// First page filtered by a search term.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }
}

/// One page of results plus the total match count.
///
/// `total_count` always reflects the full filtered set, whatever page was
/// requested, so callers can compute page counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientPage {
    pub records: Vec<Patient>,
    pub total_count: usize,
}

/// CRUD access to patient records.
pub struct PatientRepository<S: PatientStore> {
    store: S,
}

impl PatientRepository<MemoryStore> {
    /// Repository over the volatile in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: PatientStore> PatientRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// List records newest-first, filtered by the search term and sliced to
    /// the requested page. An out-of-range page yields an empty page, not
    /// an error.
    pub fn list(&self, query: &ListQuery) -> RepoResult<PatientPage> {
        let mut records = self.store.all()?;
        records.sort_by_key(|p| std::cmp::Reverse(creation_instant(p)));

        let term = query.search.trim();
        let filtered: Vec<Patient> = if term.is_empty() {
            records
        } else {
            let name_term = term.to_lowercase();
            // An all-text term normalizes to no digits and applies no CPF
            // criterion; the empty string would otherwise match every record.
            let digit_term = normalize::digits(term);
            records
                .into_iter()
                .filter(|p| {
                    p.full_name.to_lowercase().contains(&name_term)
                        || (!digit_term.is_empty() && p.cpf.contains(&digit_term))
                })
                .collect()
        };

        let total_count = filtered.len();
        let start = query.page.max(1) - 1;
        let records: Vec<Patient> = filtered
            .into_iter()
            .skip(start.saturating_mul(query.page_size))
            .take(query.page_size)
            .collect();

        debug!(
            total_count,
            page = query.page,
            returned = records.len(),
            "listed patients"
        );
        Ok(PatientPage {
            records,
            total_count,
        })
    }

    /// Fetch one record; absence is a normal outcome, not an error.
    pub fn get(&self, id: &str) -> RepoResult<Option<Patient>> {
        Ok(self.store.get(id)?)
    }

    /// Create a record with a fresh id and `created_at == updated_at`.
    pub fn create(&mut self, payload: NewPatient) -> RepoResult<Patient> {
        let record = payload
            .canonicalized()
            .into_record(Uuid::new_v4().to_string(), Utc::now());
        self.store.insert(record.clone())?;
        debug!(id = %record.id, "patient created");
        Ok(record)
    }

    /// Merge a sparse patch over the stored record.
    ///
    /// Fields absent from the patch stay unchanged; `id` and `created_at`
    /// are immutable; `updated_at` is refreshed. Fails with
    /// [`RepositoryError::NotFound`] when the id is unknown, leaving the
    /// store untouched.
    pub fn update(&mut self, patch: PatientUpdate) -> RepoResult<Patient> {
        let Some(mut record) = self.store.get(&patch.id)? else {
            warn!(id = %patch.id, "update target not found");
            return Err(RepositoryError::NotFound(patch.id));
        };

        apply_patch(&mut record, patch);
        record.updated_at = Some(Utc::now());

        self.store.replace(record.clone())?;
        debug!(id = %record.id, "patient updated");
        Ok(record)
    }

    /// Remove a record. Idempotent: deleting an absent id succeeds
    /// silently.
    pub fn delete(&mut self, id: &str) -> RepoResult<()> {
        let removed = self.store.remove(id)?;
        debug!(id, removed, "patient deleted");
        Ok(())
    }
}

/// Sort instant with the epoch fallback for records missing `created_at`,
/// which sort as the oldest.
fn creation_instant(patient: &Patient) -> DateTime<Utc> {
    patient.created_at.unwrap_or(DateTime::UNIX_EPOCH)
}

/// Overlay the patch onto the record, canonicalizing as the create path
/// does. The full destructure keeps this in sync with the payload type.
fn apply_patch(record: &mut Patient, patch: PatientUpdate) {
    let PatientUpdate {
        id: _,
        full_name,
        cpf,
        rg,
        other_document_type,
        other_document_number,
        birth_date,
        gender,
        ethnicity,
        race,
        nationality,
        profession,
        marital_status,
        mother_name,
        father_name,
        responsible_name,
        responsible_cpf,
        phone_primary,
        phone_secondary,
        email,
        legacy_code,
        observations,
        address_zip_code,
        street,
        number,
        complement,
        district,
        city,
        state,
        behavior_score,
        absenteeism_risk_score,
        communication_preferences,
    } = patch;

    if let Some(value) = full_name {
        record.full_name = value.trim().to_string();
    }
    if let Some(value) = cpf {
        record.cpf = normalize::digits(&value);
    }
    if let Some(value) = phone_primary {
        record.phone_primary = normalize::digits(&value);
    }
    if let Some(value) = birth_date {
        record.birth_date = value;
    }

    digits_patch(responsible_cpf).apply(&mut record.responsible_cpf);
    digits_patch(address_zip_code).apply(&mut record.address_zip_code);

    clean_patch(rg).apply(&mut record.rg);
    clean_patch(other_document_type).apply(&mut record.other_document_type);
    clean_patch(other_document_number).apply(&mut record.other_document_number);
    clean_patch(gender).apply(&mut record.gender);
    clean_patch(ethnicity).apply(&mut record.ethnicity);
    clean_patch(race).apply(&mut record.race);
    clean_patch(nationality).apply(&mut record.nationality);
    clean_patch(profession).apply(&mut record.profession);
    clean_patch(marital_status).apply(&mut record.marital_status);
    clean_patch(mother_name).apply(&mut record.mother_name);
    clean_patch(father_name).apply(&mut record.father_name);
    clean_patch(responsible_name).apply(&mut record.responsible_name);
    clean_patch(phone_secondary).apply(&mut record.phone_secondary);
    clean_patch(email).apply(&mut record.email);
    clean_patch(legacy_code).apply(&mut record.legacy_code);
    clean_patch(observations).apply(&mut record.observations);
    clean_patch(street).apply(&mut record.street);
    clean_patch(number).apply(&mut record.number);
    clean_patch(complement).apply(&mut record.complement);
    clean_patch(district).apply(&mut record.district);
    clean_patch(city).apply(&mut record.city);
    clean_patch(state).apply(&mut record.state);

    behavior_score.apply(&mut record.behavior_score);
    absenteeism_risk_score.apply(&mut record.absenteeism_risk_score);
    communication_preferences.apply(&mut record.communication_preferences);
}

/// A set value that trims to nothing clears the field.
fn clean_patch(patch: Patch<String>) -> Patch<String> {
    match patch {
        Patch::Set(value) => match normalize::clean(Some(value)) {
            Some(cleaned) => Patch::Set(cleaned),
            None => Patch::Clear,
        },
        other => other,
    }
}

/// A set value with no digits clears the field.
fn digits_patch(patch: Patch<String>) -> Patch<String> {
    match patch {
        Patch::Set(value) => match normalize::clean_digits(Some(value)) {
            Some(stripped) => Patch::Set(stripped),
            None => Patch::Clear,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payload(name: &str, cpf: &str) -> NewPatient {
        NewPatient {
            full_name: name.into(),
            cpf: cpf.into(),
            phone_primary: "11999998888".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_text_only_term_does_not_match_by_cpf() {
        let mut repo = PatientRepository::in_memory();
        repo.create(payload("Maria Silva", "12345678901")).unwrap();
        repo.create(payload("João Prado", "99988877766")).unwrap();

        let result = repo.list(&ListQuery::search("maria")).unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.records[0].full_name, "Maria Silva");

        // No name contains "zzz" and a digit-free term applies no CPF
        // criterion, so nothing matches.
        let result = repo.list(&ListQuery::search("zzz")).unwrap();
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn test_formatted_search_term_matches_stored_digits() {
        let mut repo = PatientRepository::in_memory();
        repo.create(payload("Maria Silva", "123.456.789-01")).unwrap();

        let result = repo.list(&ListQuery::search("123.456")).unwrap();
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_page_zero_reads_as_first_page() {
        let mut repo = PatientRepository::in_memory();
        repo.create(payload("Maria Silva", "12345678901")).unwrap();

        let zero = repo
            .list(&ListQuery {
                page: 0,
                ..Default::default()
            })
            .unwrap();
        let one = repo.list(&ListQuery::page(1)).unwrap();
        assert_eq!(zero, one);
    }

    #[test]
    fn test_records_without_created_at_sort_oldest() {
        let mut repo = PatientRepository::in_memory();
        let fresh = repo.create(payload("Maria Silva", "12345678901")).unwrap();

        // Simulate a record imported without timestamps.
        let mut legacy = payload("Ana Prado", "11122233344")
            .canonicalized()
            .into_record("legacy".into(), Utc::now());
        legacy.created_at = None;
        legacy.updated_at = None;
        repo.store.insert(legacy).unwrap();

        let result = repo.list(&ListQuery::default()).unwrap();
        assert_eq!(result.records[0].id, fresh.id);
        assert_eq!(result.records[1].id, "legacy");
    }

    #[test]
    fn test_update_canonicalizes_patched_identifiers() {
        let mut repo = PatientRepository::in_memory();
        let created = repo.create(payload("Maria Silva", "12345678901")).unwrap();

        let mut patch = PatientUpdate::for_id(&created.id);
        patch.cpf = Some("999.888.777-66".into());
        patch.address_zip_code = Patch::Set("01310-100".into());
        patch.email = Patch::Set("   ".into());

        let updated = repo.update(patch).unwrap();
        assert_eq!(updated.cpf, "99988877766");
        assert_eq!(updated.address_zip_code.as_deref(), Some("01310100"));
        // Whitespace-only input clears rather than storing blanks.
        assert_eq!(updated.email, None);
    }
}
