//! Typed access to the storage bucket.
//!
//! Each record family lives under one bucket key as a JSON document, the
//! same layout the browser build used in local storage. A missing key reads
//! as the empty value for its family.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{DatabaseError, KeyValueStore, MemoryBucket};
use crate::models::{LinkRequest, PatientClinicalRecord, PublicUser, User};

pub const USERS_KEY: &str = "syntaxHealth_users";
pub const CURRENT_USER_KEY: &str = "syntaxHealth_currentUser";
pub const REQUESTS_KEY: &str = "syntaxHealth_requests";
pub const PATIENT_DATA_KEY: &str = "syntaxHealth_patientData";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

/// Clinical records keyed by patient id.
pub type PatientDataMap = BTreeMap<String, PatientClinicalRecord>;

/// Generate a record id: `id_<unix millis>_<7 base-36 chars>`.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("id_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Record families stored in one bucket.
///
/// Every mutation is a read-modify-write of a whole family. Callers take
/// `lock_writes()` around the pair so concurrent handlers in this process
/// do not drop each other's updates.
pub struct Repository {
    bucket: Arc<dyn KeyValueStore>,
    writes: Mutex<()>,
}

impl Repository {
    pub fn new(bucket: Arc<dyn KeyValueStore>) -> Self {
        Self {
            bucket,
            writes: Mutex::new(()),
        }
    }

    /// Repository over a fresh in-memory bucket.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBucket::new()))
    }

    pub fn bucket(&self) -> &Arc<dyn KeyValueStore> {
        &self.bucket
    }

    /// Serialize read-modify-write sequences within this process.
    pub fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, DatabaseError> {
        self.writes.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, DatabaseError> {
        match self.bucket.get_item(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(T::default()),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), DatabaseError> {
        let raw = serde_json::to_string(value)?;
        self.bucket.set_item(key, &raw)
    }

    // ── Users ───────────────────────────────────────────────

    pub fn load_users(&self) -> Result<Vec<User>, DatabaseError> {
        self.read_json(USERS_KEY)
    }

    pub fn save_users(&self, users: &[User]) -> Result<(), DatabaseError> {
        self.write_json(USERS_KEY, users)
    }

    // ── Link requests ───────────────────────────────────────

    pub fn load_requests(&self) -> Result<Vec<LinkRequest>, DatabaseError> {
        self.read_json(REQUESTS_KEY)
    }

    pub fn save_requests(&self, requests: &[LinkRequest]) -> Result<(), DatabaseError> {
        self.write_json(REQUESTS_KEY, requests)
    }

    // ── Session ─────────────────────────────────────────────

    pub fn load_current_user(&self) -> Result<Option<PublicUser>, DatabaseError> {
        self.read_json(CURRENT_USER_KEY)
    }

    /// Store the session user, or remove the key entirely on `None`.
    pub fn save_current_user(&self, user: Option<&PublicUser>) -> Result<(), DatabaseError> {
        match user {
            Some(user) => self.write_json(CURRENT_USER_KEY, user),
            None => self.bucket.remove_item(CURRENT_USER_KEY),
        }
    }

    // ── Patient clinical data ───────────────────────────────

    pub fn load_patient_data(&self) -> Result<PatientDataMap, DatabaseError> {
        self.read_json(PATIENT_DATA_KEY)
    }

    pub fn save_patient_data(&self, data: &PatientDataMap) -> Result<(), DatabaseError> {
        self.write_json(PATIENT_DATA_KEY, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkStatus, Role};

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = generate_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "id");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let repo = Repository::in_memory();
        assert!(repo.load_users().unwrap().is_empty());
        assert!(repo.load_requests().unwrap().is_empty());
        assert!(repo.load_current_user().unwrap().is_none());
        assert!(repo.load_patient_data().unwrap().is_empty());
    }

    #[test]
    fn users_are_stored_under_the_users_key() {
        let repo = Repository::in_memory();
        let user = User {
            id: "id_1_aaaaaaa".into(),
            name: "Dr. Grey".into(),
            email: "grey@example.com".into(),
            password: "pw".into(),
            role: Role::Clinician,
            approved: true,
            patient_type: None,
        };
        repo.save_users(&[user.clone()]).unwrap();

        let raw = repo.bucket().get_item(USERS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"role\":\"clinician\""));
        assert_eq!(repo.load_users().unwrap(), vec![user]);
    }

    #[test]
    fn clearing_session_removes_key() {
        let repo = Repository::in_memory();
        let user = PublicUser {
            id: "u".into(),
            name: "N".into(),
            email: "e".into(),
            role: Role::Patient,
            approved: true,
            patient_type: None,
        };
        repo.save_current_user(Some(&user)).unwrap();
        assert_eq!(repo.load_current_user().unwrap(), Some(user));

        repo.save_current_user(None).unwrap();
        assert!(repo.bucket().get_item(CURRENT_USER_KEY).unwrap().is_none());
    }

    #[test]
    fn requests_round_trip_through_bucket() {
        let repo = Repository::in_memory();
        let req = LinkRequest {
            id: generate_id(),
            patient_id: "p".into(),
            clinician_id: "c".into(),
            status: LinkStatus::Pending,
        };
        repo.save_requests(&[req.clone()]).unwrap();
        assert_eq!(repo.load_requests().unwrap(), vec![req]);
    }

    #[test]
    fn malformed_value_surfaces_as_error() {
        let repo = Repository::in_memory();
        repo.bucket().set_item(USERS_KEY, "{oops").unwrap();
        assert!(matches!(repo.load_users(), Err(DatabaseError::Serialization(_))));
    }
}
