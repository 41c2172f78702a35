use serde::{Deserialize, Serialize};

use super::Role;

/// A stored account. The password is kept in plaintext: the bucket is a
/// demo store with no confidentiality guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub approved: bool,
    #[serde(default)]
    pub patient_type: Option<String>,
}

/// A user without the password. This is what login, registration and
/// the session holder hand out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    #[serde(default)]
    pub patient_type: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            approved: user.approved,
            patient_type: user.patient_type.clone(),
        }
    }
}

impl PublicUser {
    /// Uppercased first character of the name, shown as the avatar.
    pub fn avatar_initial(&self) -> Option<String> {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
    }
}

/// Patient entry in a clinician's "my patients" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub patient_type: Option<String>,
}

impl From<&User> for PatientSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            patient_type: user.patient_type.clone(),
        }
    }
}

/// Registration form input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub patient_type: Option<String>,
}
