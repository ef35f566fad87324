//! Patient models.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::patch::Patch;
use crate::normalize;

/// A stored patient record.
///
/// `cpf`, `phone_primary`, `responsible_cpf`, and `address_zip_code` are
/// always held digits-only; optional text fields are trimmed, with empty
/// input collapsed to `None`. Timestamps are optional so records imported
/// from a pre-existing store without them stay representable; every record
/// created through the repository has both set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique record id, assigned on creation and immutable.
    pub id: String,
    /// Patient full name.
    pub full_name: String,
    /// National taxpayer identifier, 11 digits.
    pub cpf: String,
    /// State identity document number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_document_number: Option<String>,
    /// Date of birth (`yyyy-MM-dd`).
    pub birth_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    /// Legal guardian or responsible party, for minors and dependents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,
    /// CPF of the responsible party, 11 digits when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_cpf: Option<String>,
    /// Primary contact phone, at least 10 digits.
    pub phone_primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Record code carried over from a previous system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Postal code (CEP), 8 digits when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Two-letter federated-state code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Behavior score; computed externally, stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_score: Option<f64>,
    /// Absenteeism risk score; computed externally, stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absenteeism_risk_score: Option<f64>,
    /// Opt-in flags per communication channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_preferences: Option<HashMap<String, bool>>,
    /// Creation timestamp, system-managed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update timestamp, refreshed on every update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create payload: every [`Patient`] field except the system-assigned
/// `id`, `created_at`, and `updated_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub full_name: String,
    pub cpf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_document_number: Option<String>,
    pub birth_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_cpf: Option<String>,
    pub phone_primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absenteeism_risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_preferences: Option<HashMap<String, bool>>,
}

impl NewPatient {
    /// Canonical storage form: identifier fields digits-only, free-text
    /// optionals trimmed with empty input collapsed to absent.
    pub fn canonicalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.cpf = normalize::digits(&self.cpf);
        self.phone_primary = normalize::digits(&self.phone_primary);
        self.responsible_cpf = normalize::clean_digits(self.responsible_cpf);
        self.address_zip_code = normalize::clean_digits(self.address_zip_code);

        self.rg = normalize::clean(self.rg);
        self.other_document_type = normalize::clean(self.other_document_type);
        self.other_document_number = normalize::clean(self.other_document_number);
        self.gender = normalize::clean(self.gender);
        self.ethnicity = normalize::clean(self.ethnicity);
        self.race = normalize::clean(self.race);
        self.nationality = normalize::clean(self.nationality);
        self.profession = normalize::clean(self.profession);
        self.marital_status = normalize::clean(self.marital_status);
        self.mother_name = normalize::clean(self.mother_name);
        self.father_name = normalize::clean(self.father_name);
        self.responsible_name = normalize::clean(self.responsible_name);
        self.phone_secondary = normalize::clean(self.phone_secondary);
        self.email = normalize::clean(self.email);
        self.legacy_code = normalize::clean(self.legacy_code);
        self.observations = normalize::clean(self.observations);
        self.street = normalize::clean(self.street);
        self.number = normalize::clean(self.number);
        self.complement = normalize::clean(self.complement);
        self.district = normalize::clean(self.district);
        self.city = normalize::clean(self.city);
        self.state = normalize::clean(self.state);
        self
    }

    /// Build the stored record with system-assigned fields.
    pub(crate) fn into_record(self, id: String, now: DateTime<Utc>) -> Patient {
        Patient {
            id,
            full_name: self.full_name,
            cpf: self.cpf,
            rg: self.rg,
            other_document_type: self.other_document_type,
            other_document_number: self.other_document_number,
            birth_date: self.birth_date,
            gender: self.gender,
            ethnicity: self.ethnicity,
            race: self.race,
            nationality: self.nationality,
            profession: self.profession,
            marital_status: self.marital_status,
            mother_name: self.mother_name,
            father_name: self.father_name,
            responsible_name: self.responsible_name,
            responsible_cpf: self.responsible_cpf,
            phone_primary: self.phone_primary,
            phone_secondary: self.phone_secondary,
            email: self.email,
            legacy_code: self.legacy_code,
            observations: self.observations,
            address_zip_code: self.address_zip_code,
            street: self.street,
            number: self.number,
            complement: self.complement,
            district: self.district,
            city: self.city,
            state: self.state,
            behavior_score: self.behavior_score,
            absenteeism_risk_score: self.absenteeism_risk_score,
            communication_preferences: self.communication_preferences,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Sparse update patch.
///
/// Required-field slots use `Option` (absent means unchanged). Nullable
/// slots use [`Patch`] so an explicit `null` clears the field while a
/// missing key keeps it. `id` and the timestamps are never client-settable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientUpdate {
    /// Target record id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub rg: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub other_document_type: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub other_document_number: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub gender: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub ethnicity: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub race: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub nationality: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub profession: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub marital_status: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub mother_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub father_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub responsible_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub responsible_cpf: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_primary: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub phone_secondary: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub email: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub legacy_code: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub observations: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub address_zip_code: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub street: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub number: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub complement: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub district: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub city: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub state: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub behavior_score: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub absenteeism_risk_score: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub communication_preferences: Patch<HashMap<String, bool>>,
}

impl PatientUpdate {
    /// An empty patch for the given record.
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}
