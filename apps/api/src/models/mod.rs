pub mod onboarding;

pub use onboarding::{
    ChecklistTask, Department, OnboardingRecord, RequiredAsset, RiskLevel,
};
