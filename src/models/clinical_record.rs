use serde::{Deserialize, Serialize};

/// Personal details entered by a clinician.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub full_name: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
}

/// Clinical measurements entered by a clinician. Blank form fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicalDetails {
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub glucose: Option<f64>,
    pub platelets: Option<f64>,
    pub bp_sys: Option<u32>,
    pub bp_dia: Option<u32>,
    pub heart_rate: Option<u32>,
    pub hba1c: Option<f64>,
    pub notes: String,
}

/// Everything a clinician records for one patient. Saved wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientClinicalRecord {
    pub personal: PersonalDetails,
    pub clinical: ClinicalDetails,
}

impl PatientClinicalRecord {
    /// Trim the free-text fields the way the clinician form does.
    /// Date of birth and gender are kept exactly as entered.
    pub fn normalized(mut self) -> Self {
        self.personal.full_name = self.personal.full_name.trim().to_string();
        self.personal.phone = self.personal.phone.trim().to_string();
        self.personal.address = self.personal.address.trim().to_string();
        self.clinical.notes = self.clinical.notes.trim().to_string();
        self
    }

    /// Empty record with only the name filled in.
    pub fn prefilled(full_name: &str) -> Self {
        Self {
            personal: PersonalDetails {
                full_name: full_name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_text_fields_only() {
        let record = PatientClinicalRecord {
            personal: PersonalDetails {
                full_name: "  Jane Doe ".into(),
                dob: " 1990-01-01".into(),
                gender: "female".into(),
                phone: " 555 ".into(),
                address: "\t1 Main St\n".into(),
            },
            clinical: ClinicalDetails {
                notes: "  follow up  ".into(),
                ..Default::default()
            },
        }
        .normalized();

        assert_eq!(record.personal.full_name, "Jane Doe");
        assert_eq!(record.personal.dob, " 1990-01-01");
        assert_eq!(record.personal.phone, "555");
        assert_eq!(record.personal.address, "1 Main St");
        assert_eq!(record.clinical.notes, "follow up");
    }

    #[test]
    fn reads_form_json_with_nulls() {
        let raw = r#"{
            "personal": {"fullName": "Jane", "dob": "", "gender": "", "phone": "", "address": ""},
            "clinical": {"age": 41, "weight": 62.5, "height": null, "bpSys": 128, "heartRate": null, "notes": ""}
        }"#;
        let record: PatientClinicalRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.clinical.age, Some(41));
        assert_eq!(record.clinical.weight, Some(62.5));
        assert_eq!(record.clinical.height, None);
        assert_eq!(record.clinical.bp_sys, Some(128));
        assert_eq!(record.clinical.hba1c, None);
    }

    #[test]
    fn prefilled_sets_only_the_name() {
        let record = PatientClinicalRecord::prefilled("Sam");
        assert_eq!(record.personal.full_name, "Sam");
        assert_eq!(record.clinical, ClinicalDetails::default());
    }
}
