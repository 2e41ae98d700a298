use serde::{Deserialize, Serialize};

/// Per-template thresholds parametrizing the real-level walk.
///
/// Example JSON:
/// ```json
/// { "low_tenure_threshold": 80, "high_tenure_threshold": 95, "tenure_years_cutoff": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Percentage a level must reach when tenure is below the cutoff (default: 80)
    #[serde(default = "default_low_tenure_threshold")]
    pub low_tenure_threshold: f64,

    /// Percentage a level must reach once tenure reaches the cutoff (default: 95)
    #[serde(default = "default_high_tenure_threshold")]
    pub high_tenure_threshold: f64,

    /// Tenure in years separating the two thresholds (default: 3)
    #[serde(default = "default_tenure_years_cutoff")]
    pub tenure_years_cutoff: f64,

    /// Expected level label copied onto every pillar result (default: "Advanced")
    #[serde(default = "default_expected_level")]
    pub default_expected_level: String,
}

fn default_low_tenure_threshold() -> f64 {
    80.0
}

fn default_high_tenure_threshold() -> f64 {
    95.0
}

fn default_tenure_years_cutoff() -> f64 {
    3.0
}

fn default_expected_level() -> String {
    "Advanced".to_string()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            low_tenure_threshold: default_low_tenure_threshold(),
            high_tenure_threshold: default_high_tenure_threshold(),
            tenure_years_cutoff: default_tenure_years_cutoff(),
            default_expected_level: default_expected_level(),
        }
    }
}

impl TemplateConfig {
    /// Threshold that applies to a subject with the given tenure.
    pub fn threshold_for(&self, tenure_years: f64) -> f64 {
        if tenure_years < self.tenure_years_cutoff {
            self.low_tenure_threshold
        } else {
            self.high_tenure_threshold
        }
    }

    /// Collects every contract violation instead of stopping at the first.
    pub fn validate(&self) -> Result<(), InputViolations> {
        let mut violations = Vec::new();

        if !is_percentage(self.low_tenure_threshold) {
            violations.push(InputViolation::ThresholdOutOfRange {
                field: "low_tenure_threshold",
                value: self.low_tenure_threshold,
            });
        }
        if !is_percentage(self.high_tenure_threshold) {
            violations.push(InputViolation::ThresholdOutOfRange {
                field: "high_tenure_threshold",
                value: self.high_tenure_threshold,
            });
        }
        if !self.tenure_years_cutoff.is_finite() || self.tenure_years_cutoff < 0.0 {
            violations.push(InputViolation::InvalidTenureCutoff(self.tenure_years_cutoff));
        }

        InputViolations::from_vec(violations)
    }
}

fn is_percentage(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

/// Checks the subject tenure supplied alongside a template.
pub fn validate_tenure(tenure_years: f64) -> Result<(), InputViolation> {
    if tenure_years.is_finite() && tenure_years >= 0.0 {
        Ok(())
    } else {
        Err(InputViolation::InvalidTenure(tenure_years))
    }
}

/// Input-contract violation detected before the engine is invoked.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputViolation {
    #[error("tenure must be a finite, non-negative number of years (got {0})")]
    InvalidTenure(f64),
    #[error("{field} must be within [0, 100] (got {value})")]
    ThresholdOutOfRange { field: &'static str, value: f64 },
    #[error("tenure_years_cutoff must be a finite, non-negative number (got {0})")]
    InvalidTenureCutoff(f64),
}

/// Non-empty set of violations reported together.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid scoring input: {}", describe(.0))]
pub struct InputViolations(pub Vec<InputViolation>);

fn describe(violations: &[InputViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl InputViolations {
    pub(crate) fn from_vec(violations: Vec<InputViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self(violations))
        }
    }
}

impl From<InputViolation> for InputViolations {
    fn from(value: InputViolation) -> Self {
        Self(vec![value])
    }
}
