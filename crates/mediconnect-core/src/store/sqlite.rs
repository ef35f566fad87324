//! SQLite-backed store.
//!
//! The database-client arm of the storage seam. `open_in_memory` keeps the
//! same volatile lifetime as [`MemoryStore`](super::MemoryStore); `open`
//! points at a file.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{PatientStore, StoreError, StoreResult, SCHEMA};
use crate::models::Patient;

const COLUMNS: &str = "id, full_name, cpf, rg, other_document_type, other_document_number, \
    birth_date, gender, ethnicity, race, nationality, profession, marital_status, \
    mother_name, father_name, responsible_name, responsible_cpf, phone_primary, \
    phone_secondary, email, legacy_code, observations, address_zip_code, street, \
    number, complement, district, city, state, behavior_score, absenteeism_risk_score, \
    communication_preferences, created_at, updated_at";

/// Record store over a SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database at `path`, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl PatientStore for SqliteStore {
    fn insert(&mut self, patient: Patient) -> StoreResult<()> {
        let enc = Encoded::try_from(&patient)?;
        self.conn.execute(
            &format!(
                "INSERT INTO patients ({COLUMNS}) VALUES (\
                 ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
                 ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, \
                 ?33, ?34)"
            ),
            params![
                patient.id,
                patient.full_name,
                patient.cpf,
                patient.rg,
                patient.other_document_type,
                patient.other_document_number,
                enc.birth_date,
                patient.gender,
                patient.ethnicity,
                patient.race,
                patient.nationality,
                patient.profession,
                patient.marital_status,
                patient.mother_name,
                patient.father_name,
                patient.responsible_name,
                patient.responsible_cpf,
                patient.phone_primary,
                patient.phone_secondary,
                patient.email,
                patient.legacy_code,
                patient.observations,
                patient.address_zip_code,
                patient.street,
                patient.number,
                patient.complement,
                patient.district,
                patient.city,
                patient.state,
                patient.behavior_score,
                patient.absenteeism_risk_score,
                enc.communication_preferences,
                enc.created_at,
                enc.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM patients WHERE id = ?"),
                [id],
                patient_row,
            )
            .optional()?;
        row.map(Patient::try_from).transpose()
    }

    fn replace(&mut self, patient: Patient) -> StoreResult<bool> {
        let enc = Encoded::try_from(&patient)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                full_name = ?2,
                cpf = ?3,
                rg = ?4,
                other_document_type = ?5,
                other_document_number = ?6,
                birth_date = ?7,
                gender = ?8,
                ethnicity = ?9,
                race = ?10,
                nationality = ?11,
                profession = ?12,
                marital_status = ?13,
                mother_name = ?14,
                father_name = ?15,
                responsible_name = ?16,
                responsible_cpf = ?17,
                phone_primary = ?18,
                phone_secondary = ?19,
                email = ?20,
                legacy_code = ?21,
                observations = ?22,
                address_zip_code = ?23,
                street = ?24,
                number = ?25,
                complement = ?26,
                district = ?27,
                city = ?28,
                state = ?29,
                behavior_score = ?30,
                absenteeism_risk_score = ?31,
                communication_preferences = ?32,
                created_at = ?33,
                updated_at = ?34
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.full_name,
                patient.cpf,
                patient.rg,
                patient.other_document_type,
                patient.other_document_number,
                enc.birth_date,
                patient.gender,
                patient.ethnicity,
                patient.race,
                patient.nationality,
                patient.profession,
                patient.marital_status,
                patient.mother_name,
                patient.father_name,
                patient.responsible_name,
                patient.responsible_cpf,
                patient.phone_primary,
                patient.phone_secondary,
                patient.email,
                patient.legacy_code,
                patient.observations,
                patient.address_zip_code,
                patient.street,
                patient.number,
                patient.complement,
                patient.district,
                patient.city,
                patient.state,
                patient.behavior_score,
                patient.absenteeism_risk_score,
                enc.communication_preferences,
                enc.created_at,
                enc.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn remove(&mut self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    fn all(&self) -> StoreResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM patients"))?;
        let rows = stmt.query_map([], patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(Patient::try_from(row?)?);
        }
        Ok(patients)
    }
}

/// Column encodings that are not plain text or numbers.
struct Encoded {
    birth_date: String,
    communication_preferences: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl TryFrom<&Patient> for Encoded {
    type Error = StoreError;

    fn try_from(patient: &Patient) -> Result<Self, Self::Error> {
        Ok(Self {
            birth_date: patient.birth_date.to_string(),
            communication_preferences: patient
                .communication_preferences
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            created_at: patient.created_at.map(|t| t.to_rfc3339()),
            updated_at: patient.updated_at.map(|t| t.to_rfc3339()),
        })
    }
}

/// Raw column values in `COLUMNS` order.
struct PatientRow {
    id: String,
    full_name: String,
    cpf: String,
    rg: Option<String>,
    other_document_type: Option<String>,
    other_document_number: Option<String>,
    birth_date: String,
    gender: Option<String>,
    ethnicity: Option<String>,
    race: Option<String>,
    nationality: Option<String>,
    profession: Option<String>,
    marital_status: Option<String>,
    mother_name: Option<String>,
    father_name: Option<String>,
    responsible_name: Option<String>,
    responsible_cpf: Option<String>,
    phone_primary: String,
    phone_secondary: Option<String>,
    email: Option<String>,
    legacy_code: Option<String>,
    observations: Option<String>,
    address_zip_code: Option<String>,
    street: Option<String>,
    number: Option<String>,
    complement: Option<String>,
    district: Option<String>,
    city: Option<String>,
    state: Option<String>,
    behavior_score: Option<f64>,
    absenteeism_risk_score: Option<f64>,
    communication_preferences: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        cpf: row.get(2)?,
        rg: row.get(3)?,
        other_document_type: row.get(4)?,
        other_document_number: row.get(5)?,
        birth_date: row.get(6)?,
        gender: row.get(7)?,
        ethnicity: row.get(8)?,
        race: row.get(9)?,
        nationality: row.get(10)?,
        profession: row.get(11)?,
        marital_status: row.get(12)?,
        mother_name: row.get(13)?,
        father_name: row.get(14)?,
        responsible_name: row.get(15)?,
        responsible_cpf: row.get(16)?,
        phone_primary: row.get(17)?,
        phone_secondary: row.get(18)?,
        email: row.get(19)?,
        legacy_code: row.get(20)?,
        observations: row.get(21)?,
        address_zip_code: row.get(22)?,
        street: row.get(23)?,
        number: row.get(24)?,
        complement: row.get(25)?,
        district: row.get(26)?,
        city: row.get(27)?,
        state: row.get(28)?,
        behavior_score: row.get(29)?,
        absenteeism_risk_score: row.get(30)?,
        communication_preferences: row.get(31)?,
        created_at: row.get(32)?,
        updated_at: row.get(33)?,
    })
}

impl TryFrom<PatientRow> for Patient {
    type Error = StoreError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            full_name: row.full_name,
            cpf: row.cpf,
            rg: row.rg,
            other_document_type: row.other_document_type,
            other_document_number: row.other_document_number,
            birth_date: NaiveDate::parse_from_str(&row.birth_date, "%Y-%m-%d")?,
            gender: row.gender,
            ethnicity: row.ethnicity,
            race: row.race,
            nationality: row.nationality,
            profession: row.profession,
            marital_status: row.marital_status,
            mother_name: row.mother_name,
            father_name: row.father_name,
            responsible_name: row.responsible_name,
            responsible_cpf: row.responsible_cpf,
            phone_primary: row.phone_primary,
            phone_secondary: row.phone_secondary,
            email: row.email,
            legacy_code: row.legacy_code,
            observations: row.observations,
            address_zip_code: row.address_zip_code,
            street: row.street,
            number: row.number,
            complement: row.complement,
            district: row.district,
            city: row.city,
            state: row.state,
            behavior_score: row.behavior_score,
            absenteeism_risk_score: row.absenteeism_risk_score,
            communication_preferences: row
                .communication_preferences
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_at: parse_instant(row.created_at)?,
            updated_at: parse_instant(row.updated_at)?,
        })
    }
}

fn parse_instant(value: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    value
        .map(|s| DateTime::parse_from_rfc3339(&s).map(|t| t.with_timezone(&Utc)))
        .transpose()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::NewPatient;

    fn full_record(id: &str) -> Patient {
        let prefs: HashMap<String, bool> =
            [("email".to_string(), true), ("sms".to_string(), false)]
                .into_iter()
                .collect();
        NewPatient {
            full_name: "Maria Silva".into(),
            cpf: "12345678901".into(),
            phone_primary: "11999998888".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            rg: Some("12.345.678-9".into()),
            email: Some("maria@clinic.com.br".into()),
            responsible_cpf: Some("52998224725".into()),
            address_zip_code: Some("01310100".into()),
            street: Some("Avenida Paulista".into()),
            city: Some("São Paulo".into()),
            state: Some("SP".into()),
            behavior_score: Some(0.82),
            communication_preferences: Some(prefs),
            ..Default::default()
        }
        .into_record(id.into(), Utc::now())
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let record = full_record("p1");
        store.insert(record.clone()).unwrap();

        let found = store.get("p1").unwrap().unwrap();
        assert_eq!(found, record);
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_replace() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(!store.replace(full_record("p1")).unwrap());

        store.insert(full_record("p1")).unwrap();
        let mut changed = full_record("p1");
        changed.city = Some("Campinas".into());
        changed.email = None;
        assert!(store.replace(changed.clone()).unwrap());
        assert_eq!(store.get("p1").unwrap().unwrap(), changed);
    }

    #[test]
    fn test_remove() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert(full_record("p1")).unwrap();

        assert!(store.remove("p1").unwrap());
        assert!(!store.remove("p1").unwrap());
    }

    #[test]
    fn test_all() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert(full_record("p1")).unwrap();
        store.insert(full_record("p2")).unwrap();

        assert_eq!(store.all().unwrap().len(), 2);
    }

    #[test]
    fn test_row_without_timestamps_is_readable() {
        // Rows imported from a previous system may predate timestamping.
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO patients (id, full_name, cpf, birth_date, phone_primary)
                 VALUES ('legacy', 'Ana Prado', '11122233344', '1970-01-01', '1133334444')",
                [],
            )
            .unwrap();

        let found = store.get("legacy").unwrap().unwrap();
        assert_eq!(found.created_at, None);
        assert_eq!(found.updated_at, None);
    }
}
