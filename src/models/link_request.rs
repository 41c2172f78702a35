use serde::{Deserialize, Serialize};

use super::LinkStatus;

/// A patient's request for a clinician to become their doctor of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub id: String,
    pub patient_id: String,
    pub clinician_id: String,
    pub status: LinkStatus,
}

impl LinkRequest {
    pub fn involves(&self, patient_id: &str, clinician_id: &str) -> bool {
        self.patient_id == patient_id && self.clinician_id == clinician_id
    }
}
