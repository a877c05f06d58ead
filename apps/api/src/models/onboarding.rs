use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical department codes recognized by the host ERP.
/// Checklist tasks may only carry one of these (or none at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "HR")]
    Hr,
    Accounts,
    Purchase,
    Training,
    Admin,
    Engineering,
    Marketing,
    Sales,
}

impl Department {
    /// Parses a host-system department code. This is NOT the generic-label
    /// mapping (`checklist::map_department`); it only accepts exact codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "IT" => Some(Department::It),
            "HR" => Some(Department::Hr),
            "Accounts" => Some(Department::Accounts),
            "Purchase" => Some(Department::Purchase),
            "Training" => Some(Department::Training),
            "Admin" => Some(Department::Admin),
            "Engineering" => Some(Department::Engineering),
            "Marketing" => Some(Department::Marketing),
            "Sales" => Some(Department::Sales),
            _ => None,
        }
    }

    /// The host-system document name for this department.
    pub fn code(&self) -> &'static str {
        match self {
            Department::It => "IT",
            Department::Hr => "HR",
            Department::Accounts => "Accounts",
            Department::Purchase => "Purchase",
            Department::Training => "Training",
            Department::Admin => "Admin",
            Department::Engineering => "Engineering",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Candidate risk classification. The classifier is total over this set:
/// anything it cannot produce collapses to `Low` at the call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl FromStr for RiskLevel {
    type Err = UnrecognizedRiskLabel;

    /// Accepts the single-word model reply in any capitalization,
    /// with trailing punctuation tolerated ("High." ⇒ High).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('.').to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(UnrecognizedRiskLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedRiskLabel(pub String);

impl fmt::Display for UnrecognizedRiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized risk label: {:?}", self.0)
    }
}

/// One onboarding to-do item with an optionally assigned department.
/// A task whose model-supplied department could not be mapped keeps its
/// description and carries no department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistTask {
    pub description: String,
    pub department: Option<Department>,
}

/// One asset requirement attached to an onboarding record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredAsset {
    pub asset_type: String,
    pub quantity: u32,
}

/// The host-system document representing one new hire's onboarding.
///
/// Owned by the ERP; this service reads it, enriches joining date,
/// checklist, and risk level, and writes it back. Never deleted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub name: String,
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub candidate_comment: Option<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
    #[serde(default)]
    pub checklist: Vec<ChecklistTask>,
    #[serde(default)]
    pub required_assets: Vec<RequiredAsset>,
}
