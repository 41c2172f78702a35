//! Role-based access control over the storage bucket.
//!
//! Manages accounts, patient → clinician link requests and the session
//! holder. Everything runs against one untrusted bucket, so the role
//! checks here are a UI convention and not a security boundary:
//! 1. Registration → new account, never logged in automatically
//! 2. Login → public user copied into the session key
//! 3. Patient requests a clinician → pending link
//! 4. Clinician accepts or rejects → link status rewritten in place
//!
//! At most one pending-or-accepted link per (patient, clinician) pair,
//! checked when the request is created only.

use crate::db::{generate_id, DatabaseError, Repository};
use crate::models::{
    LinkRequest, LinkStatus, NewUser, PatientSummary, PublicUser, Role, User,
};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// A patient's doctor of record, or the clinician they are waiting on.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DoctorLink {
    pub status: LinkStatus,
    /// `None` when a pending request points at a clinician that no longer exists.
    pub clinician: Option<PublicUser>,
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("You already have a pending or active link with this doctor.")]
    LinkExists,
    #[error("This page is only available to a signed-in {0}.")]
    LoginRequired(Role),
}

// ═══════════════════════════════════════════════════════════
// Accounts and session
// ═══════════════════════════════════════════════════════════

/// Create an account. Emails are unique case-insensitively.
///
/// New accounts are approved immediately and are NOT logged in.
pub fn register(repo: &Repository, input: NewUser) -> Result<PublicUser, AuthorizationError> {
    let _writes = repo.lock_writes()?;
    let mut users = repo.load_users()?;

    let email_lower = input.email.to_lowercase();
    if users.iter().any(|u| u.email.to_lowercase() == email_lower) {
        tracing::debug!("Registration rejected: email already in use");
        return Err(AuthorizationError::EmailTaken);
    }

    let user = User {
        id: generate_id(),
        name: input.name,
        email: input.email,
        password: input.password,
        role: input.role,
        approved: true,
        patient_type: input.patient_type,
    };
    let public = PublicUser::from(&user);
    users.push(user);
    repo.save_users(&users)?;

    tracing::info!(user_id = %public.id, role = %public.role, "Account registered");
    Ok(public)
}

/// Log in with email (case-insensitive) and exact password.
/// On success the public user becomes the session user.
pub fn login(
    repo: &Repository,
    email: &str,
    password: &str,
) -> Result<PublicUser, AuthorizationError> {
    let users = repo.load_users()?;
    let email_lower = email.to_lowercase();

    let user = users
        .iter()
        .find(|u| u.email.to_lowercase() == email_lower && u.password == password)
        .ok_or(AuthorizationError::InvalidCredentials)?;

    let public = PublicUser::from(user);
    set_current_user(repo, Some(&public))?;

    tracing::info!(user_id = %public.id, role = %public.role, "User logged in");
    Ok(public)
}

pub fn logout(repo: &Repository) -> Result<(), AuthorizationError> {
    set_current_user(repo, None)?;
    tracing::info!("User logged out");
    Ok(())
}

pub fn current_user(repo: &Repository) -> Result<Option<PublicUser>, AuthorizationError> {
    Ok(repo.load_current_user()?)
}

pub fn set_current_user(
    repo: &Repository,
    user: Option<&PublicUser>,
) -> Result<(), AuthorizationError> {
    Ok(repo.save_current_user(user)?)
}

/// Session user, if it has the given role.
///
/// Mirrors the dashboard guards: anyone else is sent back to the login page.
pub fn require_role(repo: &Repository, role: Role) -> Result<PublicUser, AuthorizationError> {
    match repo.load_current_user()? {
        Some(user) if user.role == role => Ok(user),
        _ => Err(AuthorizationError::LoginRequired(role)),
    }
}

pub fn user_by_id(repo: &Repository, id: &str) -> Result<Option<User>, AuthorizationError> {
    Ok(repo.load_users()?.into_iter().find(|u| u.id == id))
}

/// Clinicians whose name or email contains the query, case-insensitively.
/// An empty query matches every clinician.
pub fn search_clinicians(repo: &Repository, query: &str) -> Result<Vec<User>, AuthorizationError> {
    let q = query.trim().to_lowercase();
    Ok(repo
        .load_users()?
        .into_iter()
        .filter(|u| {
            u.role == Role::Clinician
                && (u.name.to_lowercase().contains(&q) || u.email.to_lowercase().contains(&q))
        })
        .collect())
}

// ═══════════════════════════════════════════════════════════
// Link requests
// ═══════════════════════════════════════════════════════════

/// Patient asks a clinician to become their doctor.
///
/// Refused while a pending or accepted request exists for the pair; a
/// rejected pair may ask again.
pub fn request_link(
    repo: &Repository,
    patient_id: &str,
    clinician_id: &str,
) -> Result<LinkRequest, AuthorizationError> {
    let _writes = repo.lock_writes()?;
    let mut requests = repo.load_requests()?;

    if requests
        .iter()
        .any(|r| r.involves(patient_id, clinician_id) && r.status.is_open())
    {
        return Err(AuthorizationError::LinkExists);
    }

    let request = LinkRequest {
        id: generate_id(),
        patient_id: patient_id.to_string(),
        clinician_id: clinician_id.to_string(),
        status: LinkStatus::Pending,
    };
    requests.push(request.clone());
    repo.save_requests(&requests)?;

    tracing::info!(
        request_id = %request.id,
        patient_id,
        clinician_id,
        "Link request created"
    );
    Ok(request)
}

/// Every request addressed to a clinician, any status.
pub fn requests_for_clinician(
    repo: &Repository,
    clinician_id: &str,
) -> Result<Vec<LinkRequest>, AuthorizationError> {
    Ok(repo
        .load_requests()?
        .into_iter()
        .filter(|r| r.clinician_id == clinician_id)
        .collect())
}

pub fn accept_request(repo: &Repository, request_id: &str) -> Result<bool, AuthorizationError> {
    set_request_status(repo, request_id, LinkStatus::Accepted)
}

pub fn reject_request(repo: &Repository, request_id: &str) -> Result<bool, AuthorizationError> {
    set_request_status(repo, request_id, LinkStatus::Rejected)
}

/// Overwrite a request's status. No transition rules apply.
/// Returns `false` when no request has the id.
fn set_request_status(
    repo: &Repository,
    request_id: &str,
    status: LinkStatus,
) -> Result<bool, AuthorizationError> {
    let _writes = repo.lock_writes()?;
    let mut requests = repo.load_requests()?;

    let Some(request) = requests.iter_mut().find(|r| r.id == request_id) else {
        tracing::debug!(request_id, "Link request not found");
        return Ok(false);
    };
    request.status = status;
    repo.save_requests(&requests)?;

    tracing::info!(request_id, status = %status, "Link request updated");
    Ok(true)
}

/// Patients behind a clinician's accepted requests.
/// Requests whose patient account is gone are skipped.
pub fn my_patients(
    repo: &Repository,
    clinician_id: &str,
) -> Result<Vec<PatientSummary>, AuthorizationError> {
    let requests = repo.load_requests()?;
    let users = repo.load_users()?;

    Ok(requests
        .iter()
        .filter(|r| r.clinician_id == clinician_id && r.status == LinkStatus::Accepted)
        .filter_map(|r| users.iter().find(|u| u.id == r.patient_id))
        .map(PatientSummary::from)
        .collect())
}

/// The patient's doctor of record.
///
/// The first accepted request wins. Without one, the first pending request
/// is reported instead. An accepted link to a missing clinician reads as
/// no doctor at all.
pub fn my_doctor(
    repo: &Repository,
    patient_id: &str,
) -> Result<Option<DoctorLink>, AuthorizationError> {
    let requests = repo.load_requests()?;
    let users = repo.load_users()?;
    let find_clinician = |id: &str| users.iter().find(|u| u.id == id).map(PublicUser::from);

    let accepted = requests
        .iter()
        .find(|r| r.patient_id == patient_id && r.status == LinkStatus::Accepted);

    if let Some(link) = accepted {
        return Ok(find_clinician(link.clinician_id.as_str()).map(|clinician| DoctorLink {
            status: LinkStatus::Accepted,
            clinician: Some(clinician),
        }));
    }

    let pending = requests
        .iter()
        .find(|r| r.patient_id == patient_id && r.status == LinkStatus::Pending);

    Ok(pending.map(|link| DoctorLink {
        status: LinkStatus::Pending,
        clinician: find_clinician(link.clinician_id.as_str()),
    }))
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_user(name: &str, email: &str, role: Role) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "pass123".to_string(),
            role,
            patient_type: None,
        }
    }

    /// Repository with one patient and two clinicians.
    pub(crate) fn seeded() -> (Repository, PublicUser, PublicUser, PublicUser) {
        let repo = Repository::in_memory();
        let patient = register(&repo, new_user("Pat Smith", "pat@example.com", Role::Patient)).unwrap();
        let house = register(&repo, new_user("Greg House", "house@clinic.org", Role::Clinician)).unwrap();
        let grey = register(&repo, new_user("Meredith Grey", "grey@clinic.org", Role::Clinician)).unwrap();
        (repo, patient, house, grey)
    }

    #[test]
    fn register_creates_approved_account_without_login() {
        let repo = Repository::in_memory();
        let user = register(&repo, new_user("Ann", "ann@example.com", Role::Patient)).unwrap();

        assert!(user.approved);
        assert!(user.id.starts_with("id_"));
        assert!(current_user(&repo).unwrap().is_none());
        assert_eq!(repo.load_users().unwrap()[0].password, "pass123");
    }

    #[test]
    fn register_rejects_duplicate_email_case_insensitively() {
        let repo = Repository::in_memory();
        register(&repo, new_user("Ann", "Ann@Example.com", Role::Patient)).unwrap();

        let err = register(&repo, new_user("Other", "ann@example.COM", Role::Clinician)).unwrap_err();
        assert!(matches!(err, AuthorizationError::EmailTaken));
        assert_eq!(err.to_string(), "An account with this email already exists.");
        assert_eq!(repo.load_users().unwrap().len(), 1);
    }

    #[test]
    fn register_keeps_patient_type() {
        let repo = Repository::in_memory();
        let mut input = new_user("Mia", "mia@example.com", Role::Patient);
        input.patient_type = Some("maternal".into());
        let user = register(&repo, input).unwrap();
        assert_eq!(user.patient_type.as_deref(), Some("maternal"));
    }

    #[test]
    fn login_sets_session_and_hides_password() {
        let (repo, patient, _, _) = seeded();
        let user = login(&repo, "PAT@example.com", "pass123").unwrap();

        assert_eq!(user.id, patient.id);
        assert_eq!(current_user(&repo).unwrap(), Some(user));
    }

    #[test]
    fn login_password_is_case_sensitive() {
        let (repo, _, _, _) = seeded();
        let err = login(&repo, "pat@example.com", "PASS123").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
        assert!(current_user(&repo).unwrap().is_none());
    }

    #[test]
    fn logout_clears_session() {
        let (repo, _, _, _) = seeded();
        login(&repo, "pat@example.com", "pass123").unwrap();
        logout(&repo).unwrap();
        assert!(current_user(&repo).unwrap().is_none());
    }

    #[test]
    fn set_current_user_replaces_and_clears_session() {
        let (repo, patient, house, _) = seeded();
        set_current_user(&repo, Some(&patient)).unwrap();
        assert_eq!(current_user(&repo).unwrap(), Some(patient));

        set_current_user(&repo, Some(&house)).unwrap();
        assert_eq!(require_role(&repo, Role::Clinician).unwrap().id, house.id);

        set_current_user(&repo, None).unwrap();
        assert!(current_user(&repo).unwrap().is_none());
    }

    #[test]
    fn require_role_checks_session_role() {
        let (repo, patient, _, _) = seeded();
        assert!(matches!(
            require_role(&repo, Role::Patient),
            Err(AuthorizationError::LoginRequired(Role::Patient))
        ));

        login(&repo, "pat@example.com", "pass123").unwrap();
        assert_eq!(require_role(&repo, Role::Patient).unwrap().id, patient.id);
        assert!(require_role(&repo, Role::Clinician).is_err());
    }

    #[test]
    fn search_matches_name_or_email_of_clinicians_only() {
        let (repo, _, house, grey) = seeded();

        let by_name = search_clinicians(&repo, "  HOUSE ").unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, house.id);

        let by_domain = search_clinicians(&repo, "clinic.org").unwrap();
        assert_eq!(by_domain.len(), 2);
        assert_eq!(by_domain[1].id, grey.id);

        assert!(search_clinicians(&repo, "pat").unwrap().is_empty());
    }

    #[test]
    fn empty_search_returns_every_clinician() {
        let (repo, _, _, _) = seeded();
        assert_eq!(search_clinicians(&repo, "").unwrap().len(), 2);
    }

    #[test]
    fn request_link_creates_pending_request() {
        let (repo, patient, house, _) = seeded();
        let req = request_link(&repo, &patient.id, &house.id).unwrap();

        assert_eq!(req.status, LinkStatus::Pending);
        let for_house = requests_for_clinician(&repo, &house.id).unwrap();
        assert_eq!(for_house, vec![req]);
    }

    #[test]
    fn duplicate_open_request_is_refused() {
        let (repo, patient, house, _) = seeded();
        request_link(&repo, &patient.id, &house.id).unwrap();

        let err = request_link(&repo, &patient.id, &house.id).unwrap_err();
        assert!(matches!(err, AuthorizationError::LinkExists));

        let req = &requests_for_clinician(&repo, &house.id).unwrap()[0];
        accept_request(&repo, &req.id).unwrap();
        assert!(request_link(&repo, &patient.id, &house.id).is_err());
    }

    #[test]
    fn rejected_pair_may_request_again() {
        let (repo, patient, house, _) = seeded();
        let first = request_link(&repo, &patient.id, &house.id).unwrap();
        assert!(reject_request(&repo, &first.id).unwrap());

        let second = request_link(&repo, &patient.id, &house.id).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(requests_for_clinician(&repo, &house.id).unwrap().len(), 2);
    }

    #[test]
    fn accept_and_reject_unknown_id_return_false() {
        let (repo, _, _, _) = seeded();
        assert!(!accept_request(&repo, "id_missing").unwrap());
        assert!(!reject_request(&repo, "id_missing").unwrap());
    }

    #[test]
    fn status_can_be_overwritten_freely() {
        let (repo, patient, house, _) = seeded();
        let req = request_link(&repo, &patient.id, &house.id).unwrap();
        reject_request(&repo, &req.id).unwrap();
        accept_request(&repo, &req.id).unwrap();
        assert_eq!(
            requests_for_clinician(&repo, &house.id).unwrap()[0].status,
            LinkStatus::Accepted
        );
    }

    #[test]
    fn my_patients_lists_accepted_only() {
        let (repo, patient, house, _) = seeded();
        let other = register(&repo, new_user("Quinn", "quinn@example.com", Role::Patient)).unwrap();

        let a = request_link(&repo, &patient.id, &house.id).unwrap();
        request_link(&repo, &other.id, &house.id).unwrap();
        accept_request(&repo, &a.id).unwrap();

        let patients = my_patients(&repo, &house.id).unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].id, patient.id);
        assert_eq!(patients[0].email, "pat@example.com");
    }

    #[test]
    fn my_patients_skips_missing_accounts() {
        let (repo, _, house, _) = seeded();
        let ghost = request_link(&repo, "id_ghost", &house.id).unwrap();
        accept_request(&repo, &ghost.id).unwrap();
        assert!(my_patients(&repo, &house.id).unwrap().is_empty());
    }

    #[test]
    fn my_doctor_prefers_accepted_over_pending() {
        let (repo, patient, house, grey) = seeded();
        assert!(my_doctor(&repo, &patient.id).unwrap().is_none());

        request_link(&repo, &patient.id, &house.id).unwrap();
        let pending = my_doctor(&repo, &patient.id).unwrap().unwrap();
        assert_eq!(pending.status, LinkStatus::Pending);
        assert_eq!(pending.clinician.unwrap().id, house.id);

        let b = request_link(&repo, &patient.id, &grey.id).unwrap();
        accept_request(&repo, &b.id).unwrap();
        let accepted = my_doctor(&repo, &patient.id).unwrap().unwrap();
        assert_eq!(accepted.status, LinkStatus::Accepted);
        assert_eq!(accepted.clinician.unwrap().id, grey.id);
    }

    #[test]
    fn my_doctor_with_missing_clinician() {
        let (repo, patient, _, _) = seeded();
        request_link(&repo, &patient.id, "id_gone").unwrap();
        let pending = my_doctor(&repo, &patient.id).unwrap().unwrap();
        assert_eq!(pending.status, LinkStatus::Pending);
        assert!(pending.clinician.is_none());

        let req = &repo.load_requests().unwrap()[0];
        accept_request(&repo, &req.id).unwrap();
        assert!(my_doctor(&repo, &patient.id).unwrap().is_none());
    }

    #[test]
    fn user_by_id_finds_stored_user() {
        let (repo, patient, _, _) = seeded();
        assert_eq!(user_by_id(&repo, &patient.id).unwrap().unwrap().name, "Pat Smith");
        assert!(user_by_id(&repo, "nope").unwrap().is_none());
    }
}
