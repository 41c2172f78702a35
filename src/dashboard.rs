//! Patient and clinician dashboards — view models.
//!
//! Each dashboard is one fetch that gathers everything the page shows.
//! Both sit behind the role guard: a session with the wrong role (or none)
//! gets `AuthorizationError::LoginRequired`.

use serde::Serialize;

use crate::authorization::{self, AuthorizationError};
use crate::db::Repository;
use crate::models::{LinkRequest, LinkStatus, PatientSummary, PublicUser, Role};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const DEMO_RISK_TREND: [f64; 7] = [22.0, 24.0, 23.0, 25.0, 24.0, 23.0, 22.0];
const DEMO_GLUCOSE: [f64; 7] = [95.0, 102.0, 98.0, 99.0, 97.0, 101.0, 98.0];
const DEMO_FACTORS: [(&str, f64); 3] = [("BMI", 85.0), ("Glucose", 90.0), ("Platelets", 88.0)];

pub const EMPTY_QUERY_MESSAGE: &str = "Enter a name or email to search.";
pub const NO_MATCH_MESSAGE: &str = "No doctors or nurses found. Try a different name or email.";
pub const REQUEST_SENT_MESSAGE: &str =
    "Request sent. The doctor will see it in their dashboard and can accept it.";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the patient stands with a doctor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DoctorStatus {
    Linked { clinician: PublicUser, message: String },
    Pending { clinician: PublicUser, message: String },
    /// No doctor yet; the search box is shown.
    Unlinked { message: String },
}

impl DoctorStatus {
    pub fn shows_search(&self) -> bool {
        matches!(self, Self::Unlinked { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
}

/// Static sample charts on the patient dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoCharts {
    pub risk_trend: ChartSeries,
    pub glucose: ChartSeries,
    pub factors: ChartSeries,
}

impl DemoCharts {
    pub fn sample() -> Self {
        Self {
            risk_trend: ChartSeries {
                labels: WEEKDAYS.to_vec(),
                values: DEMO_RISK_TREND.to_vec(),
            },
            glucose: ChartSeries {
                labels: WEEKDAYS.to_vec(),
                values: DEMO_GLUCOSE.to_vec(),
            },
            factors: ChartSeries {
                labels: DEMO_FACTORS.iter().map(|(l, _)| *l).collect(),
                values: DEMO_FACTORS.iter().map(|(_, v)| *v).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard {
    pub user: PublicUser,
    pub avatar_initial: Option<String>,
    pub doctor: DoctorStatus,
    pub show_doctor_search: bool,
    pub charts: DemoCharts,
}

/// Result of the patient's doctor search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSearch {
    pub results: Vec<PublicUser>,
    pub message: Option<&'static str>,
}

/// A pending request with the patient who sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub request: LinkRequest,
    pub patient: PublicUser,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicianDashboard {
    pub user: PublicUser,
    pub pending: Vec<PendingRequest>,
    pub patients: Vec<PatientSummary>,
}

// ---------------------------------------------------------------------------
// Patient side
// ---------------------------------------------------------------------------

/// Doctor status line for a patient.
pub fn doctor_status(repo: &Repository, patient_id: &str) -> Result<DoctorStatus, AuthorizationError> {
    let link = authorization::my_doctor(repo, patient_id)?;

    Ok(match link {
        Some(authorization::DoctorLink {
            status: LinkStatus::Accepted,
            clinician: Some(c),
        }) => DoctorStatus::Linked {
            message: format!("Linked with {} ({}).", c.name, c.email),
            clinician: c,
        },
        Some(authorization::DoctorLink {
            status: LinkStatus::Pending,
            clinician: Some(c),
        }) => DoctorStatus::Pending {
            message: format!(
                "Request pending with {}. Waiting for them to accept.",
                c.name
            ),
            clinician: c,
        },
        _ => DoctorStatus::Unlinked {
            message: "You are not linked to a doctor yet. Search below to send a request."
                .to_string(),
        },
    })
}

pub fn patient_dashboard(repo: &Repository) -> Result<PatientDashboard, AuthorizationError> {
    let user = authorization::require_role(repo, Role::Patient)?;
    let doctor = doctor_status(repo, &user.id)?;

    Ok(PatientDashboard {
        avatar_initial: user.avatar_initial(),
        show_doctor_search: doctor.shows_search(),
        doctor,
        charts: DemoCharts::sample(),
        user,
    })
}

/// Search clinicians for the signed-in patient, hiding the clinician they
/// are already linked to or waiting on.
pub fn search_doctors(repo: &Repository, query: &str) -> Result<DoctorSearch, AuthorizationError> {
    let user = authorization::require_role(repo, Role::Patient)?;

    if query.trim().is_empty() {
        return Ok(DoctorSearch {
            results: Vec::new(),
            message: Some(EMPTY_QUERY_MESSAGE),
        });
    }

    let clinicians = authorization::search_clinicians(repo, query)?;
    if clinicians.is_empty() {
        return Ok(DoctorSearch {
            results: Vec::new(),
            message: Some(NO_MATCH_MESSAGE),
        });
    }

    let existing = authorization::my_doctor(repo, &user.id)?
        .and_then(|link| link.clinician)
        .map(|c| c.id);

    Ok(DoctorSearch {
        results: clinicians
            .iter()
            .filter(|c| existing.as_deref() != Some(c.id.as_str()))
            .map(PublicUser::from)
            .collect(),
        message: None,
    })
}

// ---------------------------------------------------------------------------
// Clinician side
// ---------------------------------------------------------------------------

/// Pending requests for a clinician, each with its patient. Requests from
/// patients that no longer exist are dropped.
pub fn pending_requests(
    repo: &Repository,
    clinician_id: &str,
) -> Result<Vec<PendingRequest>, AuthorizationError> {
    let users = repo.load_users()?;
    Ok(authorization::requests_for_clinician(repo, clinician_id)?
        .into_iter()
        .filter(|r| r.status == LinkStatus::Pending)
        .filter_map(|request| {
            let patient = users.iter().find(|u| u.id == request.patient_id)?;
            Some(PendingRequest {
                patient: PublicUser::from(patient),
                request,
            })
        })
        .collect())
}

pub fn clinician_dashboard(repo: &Repository) -> Result<ClinicianDashboard, AuthorizationError> {
    let user = authorization::require_role(repo, Role::Clinician)?;
    Ok(ClinicianDashboard {
        pending: pending_requests(repo, &user.id)?,
        patients: authorization::my_patients(repo, &user.id)?,
        user,
    })
}
