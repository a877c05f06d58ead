//! Risk Classifier — classifies a candidate comment as Low / Medium / High.
//!
//! Failure policy is fail-open: any model failure or unrecognized label
//! defaults to `Low`. This biases classifications toward Low during an API
//! outage; that trade-off is inherited from the original workflow and kept.
//! The taken branch is recorded in `RiskSource` so callers and tests can
//! tell a real classification from a default.

use serde::Serialize;
use tracing::warn;

use crate::llm_client::ChatModel;
use crate::models::RiskLevel;

const RISK_SYSTEM: &str = "You are an HR assistant analyzing candidate sentiment.";

const RISK_PROMPT_TEMPLATE: &str = r#"Analyze the following candidate comment and classify the sentiment as:
- Low Risk
- Medium Risk
- High Risk

Candidate comment: "{comment}"

ONLY respond with one word: Low, Medium, or High"#;

const RISK_TEMPERATURE: f32 = 0.2;

/// How a risk level was arrived at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskSource {
    /// The model produced a recognized label.
    Classified,
    /// The model call failed or replied outside {Low, Medium, High};
    /// the level is the fail-open default.
    DefaultedOnError { reason: String },
}

/// Classification outcome. Total: every comment gets exactly one of
/// {Low, Medium, High}, and the default branch is explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub source: RiskSource,
}

impl RiskAssessment {
    fn defaulted(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("Risk classification defaulted to Low: {reason}");
        RiskAssessment {
            level: RiskLevel::Low,
            source: RiskSource::DefaultedOnError { reason },
        }
    }
}

/// Classifies a candidate comment. Never fails.
pub async fn classify_risk(comment: &str, chat: &dyn ChatModel) -> RiskAssessment {
    let prompt = RISK_PROMPT_TEMPLATE.replace("{comment}", comment);

    let reply = match chat.complete(RISK_SYSTEM, &prompt, RISK_TEMPERATURE).await {
        Ok(reply) => reply,
        Err(e) => return RiskAssessment::defaulted(format!("model call failed: {e}")),
    };

    match reply.parse::<RiskLevel>() {
        Ok(level) => RiskAssessment {
            level,
            source: RiskSource::Classified,
        },
        Err(e) => RiskAssessment::defaulted(e.to_string()),
    }
}
