//! Clinician-entered patient records.
//!
//! One record per patient id, replaced wholesale on every save.

use crate::authorization::{self, AuthorizationError};
use crate::db::Repository;
use crate::models::PatientClinicalRecord;

#[derive(Debug, thiserror::Error)]
pub enum PatientDataError {
    #[error("Please select a patient first.")]
    NoPatientSelected,
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

pub fn get_record(
    repo: &Repository,
    patient_id: &str,
) -> Result<Option<PatientClinicalRecord>, PatientDataError> {
    Ok(repo.load_patient_data()?.remove(patient_id))
}

/// Replace the patient's record with the submitted form.
pub fn save_record(
    repo: &Repository,
    patient_id: &str,
    record: PatientClinicalRecord,
) -> Result<PatientClinicalRecord, PatientDataError> {
    if patient_id.trim().is_empty() {
        return Err(PatientDataError::NoPatientSelected);
    }

    let record = record.normalized();
    let _writes = repo.lock_writes()?;
    let mut all = repo.load_patient_data()?;
    all.insert(patient_id.to_string(), record.clone());
    repo.save_patient_data(&all)?;

    tracing::info!(patient_id, "Patient data saved");
    Ok(record)
}

/// What the clinician form shows when a patient is selected: the stored
/// record, or a blank form carrying the patient's account name.
pub fn prefill(
    repo: &Repository,
    patient_id: &str,
) -> Result<PatientClinicalRecord, PatientDataError> {
    if let Some(record) = get_record(repo, patient_id)? {
        return Ok(record);
    }
    let name = authorization::user_by_id(repo, patient_id)?
        .map(|u| u.name)
        .unwrap_or_default();
    Ok(PatientClinicalRecord::prefilled(&name))
}
