//! Form-contract validation for incoming payloads.
//!
//! The repository trusts its caller to have run these checks; they mirror
//! what the form layer enforces before submitting. Field values that
//! normalize to nothing count as clearing the field and are not validated
//! (an empty string in a form means "unset").

use thiserror::Error;

use crate::models::{NewPatient, PatientUpdate};
use crate::normalize;

/// Payload rejection reasons.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("full name must not be empty")]
    EmptyFullName,

    #[error("CPF must have exactly 11 digits, got {0}")]
    BadCpf(usize),

    #[error("primary phone must have at least 10 digits, got {0}")]
    BadPrimaryPhone(usize),

    #[error("responsible CPF must have exactly 11 digits, got {0}")]
    BadResponsibleCpf(usize),

    #[error("malformed email address: {0}")]
    BadEmail(String),

    #[error("postal code must have exactly 8 digits, got {0}")]
    BadZipCode(usize),
}

/// Validate a create payload against the form contract.
pub fn validate_new(payload: &NewPatient) -> Result<(), ValidationError> {
    check_full_name(&payload.full_name)?;
    check_cpf(&payload.cpf)?;
    check_primary_phone(&payload.phone_primary)?;
    check_responsible_cpf(payload.responsible_cpf.as_deref())?;
    check_email(payload.email.as_deref())?;
    check_zip_code(payload.address_zip_code.as_deref())?;
    Ok(())
}

/// Validate an update patch; only the fields it sets are checked.
pub fn validate_update(payload: &PatientUpdate) -> Result<(), ValidationError> {
    if let Some(name) = payload.full_name.as_deref() {
        check_full_name(name)?;
    }
    if let Some(cpf) = payload.cpf.as_deref() {
        check_cpf(cpf)?;
    }
    if let Some(phone) = payload.phone_primary.as_deref() {
        check_primary_phone(phone)?;
    }
    check_responsible_cpf(payload.responsible_cpf.as_set().map(String::as_str))?;
    check_email(payload.email.as_set().map(String::as_str))?;
    check_zip_code(payload.address_zip_code.as_set().map(String::as_str))?;
    Ok(())
}

fn check_full_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyFullName);
    }
    Ok(())
}

fn check_cpf(cpf: &str) -> Result<(), ValidationError> {
    let count = normalize::digits(cpf).len();
    if count != 11 {
        return Err(ValidationError::BadCpf(count));
    }
    Ok(())
}

fn check_primary_phone(phone: &str) -> Result<(), ValidationError> {
    let count = normalize::digits(phone).len();
    if count < 10 {
        return Err(ValidationError::BadPrimaryPhone(count));
    }
    Ok(())
}

fn check_responsible_cpf(cpf: Option<&str>) -> Result<(), ValidationError> {
    let count = normalize::opt_digits(cpf).len();
    if count != 0 && count != 11 {
        return Err(ValidationError::BadResponsibleCpf(count));
    }
    Ok(())
}

fn check_zip_code(cep: Option<&str>) -> Result<(), ValidationError> {
    let count = normalize::opt_digits(cep).len();
    if count != 0 && count != 8 {
        return Err(ValidationError::BadZipCode(count));
    }
    Ok(())
}

// Shape check only: one '@', non-empty local part, dotted domain. Real
// deliverability belongs to the mail provider.
fn check_email(email: Option<&str>) -> Result<(), ValidationError> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let well_formed = parts.next().is_none()
        && !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if !well_formed {
        return Err(ValidationError::BadEmail(email.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patch;
    use chrono::NaiveDate;

    fn valid_payload() -> NewPatient {
        NewPatient {
            full_name: "Maria Silva".into(),
            cpf: "123.456.789-01".into(),
            phone_primary: "(11) 3333-4444".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            ..NewPatient::default()
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert_eq!(validate_new(&valid_payload()), Ok(()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut payload = valid_payload();
        payload.full_name = "   ".into();
        assert_eq!(validate_new(&payload), Err(ValidationError::EmptyFullName));
    }

    #[test]
    fn test_short_cpf_rejected() {
        let mut payload = valid_payload();
        payload.cpf = "123.456.789-0".into();
        assert_eq!(validate_new(&payload), Err(ValidationError::BadCpf(10)));
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut payload = valid_payload();
        payload.phone_primary = "999-8888".into();
        assert_eq!(
            validate_new(&payload),
            Err(ValidationError::BadPrimaryPhone(7))
        );
    }

    #[test]
    fn test_responsible_cpf_length_enforced_when_present() {
        let mut payload = valid_payload();
        payload.responsible_cpf = Some("12345".into());
        assert_eq!(
            validate_new(&payload),
            Err(ValidationError::BadResponsibleCpf(5))
        );

        payload.responsible_cpf = Some("529.982.247-25".into());
        assert_eq!(validate_new(&payload), Ok(()));
    }

    #[test]
    fn test_email_shape() {
        let mut payload = valid_payload();
        for bad in ["no-at-sign", "a@@b.co", "@b.co", "a@nodot", "a@.co", "a@b."] {
            payload.email = Some(bad.into());
            assert!(validate_new(&payload).is_err(), "accepted {bad:?}");
        }
        for good in ["ana@clinic.com.br", "a@b.co", "  a@b.co  "] {
            payload.email = Some(good.into());
            assert_eq!(validate_new(&payload), Ok(()), "rejected {good:?}");
        }
        // Empty input means "unset", never an error.
        payload.email = Some("  ".into());
        assert_eq!(validate_new(&payload), Ok(()));
    }

    #[test]
    fn test_zip_code_length() {
        let mut payload = valid_payload();
        payload.address_zip_code = Some("01310-100".into());
        assert_eq!(validate_new(&payload), Ok(()));

        payload.address_zip_code = Some("0131".into());
        assert_eq!(validate_new(&payload), Err(ValidationError::BadZipCode(4)));
    }

    #[test]
    fn test_update_checks_only_set_fields() {
        let mut patch = PatientUpdate::for_id("p1");
        assert_eq!(validate_update(&patch), Ok(()));

        patch.cpf = Some("123".into());
        assert_eq!(validate_update(&patch), Err(ValidationError::BadCpf(3)));

        patch.cpf = None;
        patch.email = Patch::Set("not-an-email".into());
        assert!(validate_update(&patch).is_err());

        // Clearing a field is always allowed.
        patch.email = Patch::Clear;
        assert_eq!(validate_update(&patch), Ok(()));
    }
}
