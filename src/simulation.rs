//! Digital-twin risk simulation.
//!
//! A fixed rule table over a handful of vitals and labs. It produces
//! cardiovascular, metabolic and "other" scores (0–100), an overall level,
//! a seven-day projection for the charts, and the explanation paragraphs
//! shown under the result cards. Deterministic: the same inputs always give
//! the same output.

use serde::{Deserialize, Serialize};

use crate::models::{PatientClinicalRecord, Sex};

pub const DEFAULT_AGE: f64 = 35.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_GLUCOSE: f64 = 98.0;
pub const DEFAULT_PLATELETS: f64 = 245.0;
pub const DEFAULT_BP_SYS: f64 = 122.0;
pub const DEFAULT_BP_DIA: f64 = 78.0;
pub const DEFAULT_HEART_RATE: f64 = 72.0;
pub const DEFAULT_HBA1C: f64 = 5.4;

const HEIGHT_RANGE_CM: (f64, f64) = (100.0, 250.0);
const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 300.0);

/// Upper bounds (inclusive) of the Low and Moderate bands.
const LOW_MAX: u32 = 33;
const MODERATE_MAX: u32 = 66;

/// Maximum characters of the user's description quoted back.
const DESCRIPTION_QUOTE_LIMIT: usize = 200;

pub const PROJECTION_DAYS: [&str; 7] = [
    "Day 1", "Day 2", "Day 3", "Day 4", "Day 5", "Day 6", "Day 7",
];
const RISK_TREND_OFFSETS: [f64; 7] = [0.0, 2.0, 1.0, 3.0, 2.0, 4.0, 3.0];
const GLUCOSE_TREND_OFFSETS: [f64; 7] = [0.0, 3.0, 1.0, 4.0, 2.0, 2.0, 3.0];

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SimulationError {
    #[error("Please enter a valid height (100–250 cm).")]
    InvalidHeight,
    #[error("Please enter a valid weight (20–300 kg).")]
    InvalidWeight,
}

/// Raw form input. Any missing field takes its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationForm {
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub glucose: Option<f64>,
    pub platelets: Option<f64>,
    pub bp_sys: Option<f64>,
    pub bp_dia: Option<f64>,
    pub heart_rate: Option<f64>,
    pub hba1c: Option<f64>,
    pub whats_wrong: Option<String>,
}

/// Fully resolved simulation inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInputs {
    pub age: f64,
    pub sex: Sex,
    pub weight: f64,
    pub height: f64,
    pub glucose: f64,
    pub platelets: f64,
    pub bp_sys: f64,
    pub bp_dia: f64,
    pub heart_rate: f64,
    pub hba1c: f64,
    pub whats_wrong: String,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        SimulationForm::default().resolve()
    }
}

impl SimulationForm {
    /// Fill in defaults. The description is trimmed.
    pub fn resolve(self) -> SimulationInputs {
        SimulationInputs {
            age: self.age.unwrap_or(DEFAULT_AGE),
            sex: self.sex.unwrap_or_default(),
            weight: self.weight.unwrap_or(DEFAULT_WEIGHT_KG),
            height: self.height.unwrap_or(DEFAULT_HEIGHT_CM),
            glucose: self.glucose.unwrap_or(DEFAULT_GLUCOSE),
            platelets: self.platelets.unwrap_or(DEFAULT_PLATELETS),
            bp_sys: self.bp_sys.unwrap_or(DEFAULT_BP_SYS),
            bp_dia: self.bp_dia.unwrap_or(DEFAULT_BP_DIA),
            heart_rate: self.heart_rate.unwrap_or(DEFAULT_HEART_RATE),
            hba1c: self.hba1c.unwrap_or(DEFAULT_HBA1C),
            whats_wrong: self.whats_wrong.unwrap_or_default().trim().to_string(),
        }
    }
}

impl From<&PatientClinicalRecord> for SimulationForm {
    /// Seed a simulation from the measurements a clinician recorded.
    fn from(record: &PatientClinicalRecord) -> Self {
        let c = &record.clinical;
        Self {
            age: c.age.map(f64::from),
            sex: record.personal.gender.parse().ok(),
            weight: c.weight,
            height: c.height,
            glucose: c.glucose,
            platelets: c.platelets,
            bp_sys: c.bp_sys.map(f64::from),
            bp_dia: c.bp_dia.map(f64::from),
            heart_rate: c.heart_rate.map(f64::from),
            hba1c: c.hba1c,
            whats_wrong: Some(c.notes.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score <= LOW_MAX {
            Self::Low
        } else if score <= MODERATE_MAX {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Style class for the result card.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "risk-low",
            Self::Moderate => "risk-moderate",
            Self::High => "risk-high",
        }
    }
}

/// A score with its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub css_class: &'static str,
}

impl RiskAssessment {
    fn new(score: u32) -> Self {
        let level = RiskLevel::from_score(score);
        Self {
            score,
            level,
            css_class: level.css_class(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Projection {
    Stable,
    Monitor,
    #[serde(rename = "Review recommended")]
    ReviewRecommended,
}

impl Projection {
    fn from_overall(overall: u32) -> Self {
        if overall < 40 {
            Self::Stable
        } else if overall < 65 {
            Self::Monitor
        } else {
            Self::ReviewRecommended
        }
    }
}

/// Chart series for the results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationCharts {
    pub labels: Vec<&'static str>,
    pub risk_trend: Vec<f64>,
    pub glucose_trend: Vec<f64>,
    /// Cardiovascular, metabolic, other.
    pub systems: [u32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub bmi: f64,
    pub overall: RiskAssessment,
    pub cardio: RiskAssessment,
    pub metabolic: RiskAssessment,
    pub other_score: u32,
    pub projection: Projection,
    pub explanation: Vec<String>,
    pub charts: SimulationCharts,
    pub inputs: SimulationInputs,
}

// ═══════════════════════════════════════════════════════════
// Scoring
// ═══════════════════════════════════════════════════════════

/// Body-mass index rounded to one decimal. Zero height yields 0.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm == 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    (weight_kg / (height_m * height_m) * 10.0).round() / 10.0
}

/// Reject heights outside 100–250 cm, then weights outside 20–300 kg.
pub fn validate(inputs: &SimulationInputs) -> Result<(), SimulationError> {
    if inputs.height < HEIGHT_RANGE_CM.0 || inputs.height > HEIGHT_RANGE_CM.1 {
        return Err(SimulationError::InvalidHeight);
    }
    if inputs.weight < WEIGHT_RANGE_KG.0 || inputs.weight > WEIGHT_RANGE_KG.1 {
        return Err(SimulationError::InvalidWeight);
    }
    Ok(())
}

fn cardio_score(inputs: &SimulationInputs) -> u32 {
    let mut score = if inputs.bp_sys > 140.0 || inputs.bp_dia > 90.0 {
        75
    } else if inputs.bp_sys > 130.0 || inputs.bp_dia > 85.0 {
        45
    } else {
        20
    };
    if inputs.heart_rate > 100.0 {
        score = (score + 25).min(90);
    }
    if inputs.heart_rate < 50.0 && inputs.heart_rate > 0.0 {
        score = (score + 15).min(80);
    }
    score
}

fn metabolic_score(inputs: &SimulationInputs, bmi: f64) -> u32 {
    let mut score = if inputs.glucose > 126.0 {
        80
    } else if inputs.glucose > 100.0 {
        50
    } else {
        25
    };
    if inputs.hba1c >= 6.5 {
        score = score.max(70);
    } else if inputs.hba1c >= 5.7 {
        score = score.max(45);
    }
    if bmi >= 30.0 {
        score = (score + 20).min(95);
    } else if bmi >= 25.0 {
        score = (score + 10).min(90);
    }
    score
}

fn other_score(inputs: &SimulationInputs) -> u32 {
    if inputs.platelets < 150.0 || inputs.platelets > 400.0 {
        55
    } else {
        15
    }
}

/// Validate and score the inputs.
pub fn run(inputs: SimulationInputs) -> Result<SimulationResult, SimulationError> {
    validate(&inputs)?;
    Ok(run_unchecked(inputs))
}

/// Score the inputs without range checks.
pub fn run_unchecked(inputs: SimulationInputs) -> SimulationResult {
    let bmi = compute_bmi(inputs.weight, inputs.height);
    let mut cardio = cardio_score(&inputs);
    let metabolic = metabolic_score(&inputs, bmi);
    let mut other = other_score(&inputs);

    if inputs.sex == Sex::Pregnant {
        cardio = (cardio + 15).min(95);
        other = (other + 10).min(90);
    }

    let mean = f64::from(cardio + metabolic + other) / 3.0;
    let overall = mean.round() as u32;

    let charts = SimulationCharts {
        labels: PROJECTION_DAYS.to_vec(),
        risk_trend: RISK_TREND_OFFSETS.iter().map(|d| mean + d).collect(),
        glucose_trend: GLUCOSE_TREND_OFFSETS
            .iter()
            .map(|d| inputs.glucose + d)
            .collect(),
        systems: [cardio, metabolic, other],
    };

    let mut result = SimulationResult {
        bmi,
        overall: RiskAssessment::new(overall),
        cardio: RiskAssessment::new(cardio),
        metabolic: RiskAssessment::new(metabolic),
        other_score: other,
        projection: Projection::from_overall(overall),
        explanation: Vec::new(),
        charts,
        inputs,
    };
    result.explanation = explain(&result);

    tracing::debug!(
        overall,
        cardio,
        metabolic,
        other,
        bmi,
        "Simulation scored"
    );
    result
}

// ═══════════════════════════════════════════════════════════
// Explanation
// ═══════════════════════════════════════════════════════════

/// Paragraphs for the "what the data means" panel, in display order.
pub fn explain(result: &SimulationResult) -> Vec<String> {
    let inputs = &result.inputs;
    let mut lines = Vec::new();

    let description = inputs.whats_wrong.trim();
    if !description.is_empty() {
        let quoted: String = description.chars().take(DESCRIPTION_QUOTE_LIMIT).collect();
        let ellipsis = if description.chars().count() > DESCRIPTION_QUOTE_LIMIT {
            "…"
        } else {
            ""
        };
        lines.push(format!(
            "You described: \"{quoted}{ellipsis}\". This context is considered in the simulation."
        ));
    }

    if inputs.sex == Sex::Pregnant {
        lines.push(
            "Maternal mode is on: the simulation includes pregnancy-related cardiovascular and physiological factors."
                .to_string(),
        );
    }

    lines.push(
        "Based on the clinical details you entered, the digital twin has run a 7-day projection."
            .to_string(),
    );

    lines.push(match result.overall.level {
        RiskLevel::Low => "Your overall risk is low. Cardiovascular and metabolic markers are within or near target ranges.".to_string(),
        RiskLevel::Moderate => "Your overall risk is moderate. One or more systems (e.g. cardiovascular or metabolic) show values that warrant attention. The simulation suggests monitoring and possible lifestyle or care adjustments.".to_string(),
        RiskLevel::High => "Your overall risk is elevated. The simulation flags cardiovascular and/or metabolic factors that may benefit from clinical review and intervention.".to_string(),
    });

    if result.bmi >= 25.0 {
        lines.push(format!(
            "Your BMI ({}) is in the overweight or obese range; the model factors this into metabolic and cardiovascular risk.",
            result.bmi
        ));
    }
    if inputs.glucose > 100.0 {
        lines.push(
            "Glucose and/or HbA1c are above optimal range; the projection assumes current diet and activity unless you change inputs."
                .to_string(),
        );
    }
    if inputs.bp_sys > 130.0 || inputs.bp_dia > 85.0 {
        lines.push(
            "Blood pressure is elevated in this scenario; the cardiovascular module projects stress on the system over the next 7 days."
                .to_string(),
        );
    }

    lines.push(
        "This is a demonstration only. Always discuss your real health data and any concerns with your clinician."
            .to_string(),
    );
    lines
}
