//! Domain models for patient management.

mod patch;
mod patient;

pub use patch::Patch;
pub use patient::{NewPatient, Patient, PatientUpdate};
