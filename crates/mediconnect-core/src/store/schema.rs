//! SQLite schema definition.

/// Complete database schema for the patient store.
pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    cpf TEXT NOT NULL,
    rg TEXT,
    other_document_type TEXT,
    other_document_number TEXT,
    birth_date TEXT NOT NULL,
    gender TEXT,
    ethnicity TEXT,
    race TEXT,
    nationality TEXT,
    profession TEXT,
    marital_status TEXT,
    mother_name TEXT,
    father_name TEXT,
    responsible_name TEXT,
    responsible_cpf TEXT,
    phone_primary TEXT NOT NULL,
    phone_secondary TEXT,
    email TEXT,
    legacy_code TEXT,
    observations TEXT,
    address_zip_code TEXT,
    street TEXT,
    number TEXT,
    complement TEXT,
    district TEXT,
    city TEXT,
    state TEXT,
    behavior_score REAL,
    absenteeism_risk_score REAL,
    communication_preferences TEXT,      -- JSON object: channel -> opt-in flag
    created_at TEXT,
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_patients_full_name ON patients(full_name);
CREATE INDEX IF NOT EXISTS idx_patients_cpf ON patients(cpf);
CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "schema should be valid SQL: {result:?}");
    }

    #[test]
    fn test_patients_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='patients'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
