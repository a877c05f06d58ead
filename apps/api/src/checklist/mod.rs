//! Checklist Generator — asks the LLM for department-wise onboarding tasks
//! and validates the departments it returns against the host system.
//!
//! Failure policy: this is the one hard failure path in the service. A model
//! or parse error surfaces to the caller as a user-facing error and the
//! checklist stays empty. There is no retry.

use serde::Deserialize;
use tracing::warn;

use crate::erp::DocumentStore;
use crate::errors::AppError;
use crate::llm_client::{parse_json_reply, ChatModel};
use crate::models::{ChecklistTask, Department};

pub mod prompts;

use prompts::{CHECKLIST_PROMPT_TEMPLATE, CHECKLIST_SYSTEM};

const CHECKLIST_TEMPERATURE: f32 = 0.3;

/// Generic department labels the model is allowed to use, in the order they
/// are listed in the prompt.
const GENERIC_DEPARTMENTS: &[&str] = &[
    "IT",
    "Human Resources",
    "Finance",
    "Procurement",
    "Training",
    "Administration",
    "Engineering",
    "Marketing",
    "Sales",
];

/// One task as the model returns it, before department validation.
#[derive(Debug, Deserialize)]
struct RawTask {
    description: String,
    #[serde(default)]
    department: Option<String>,
}

/// Maps a generic department label to the host system's canonical code.
/// Pure function: "Human Resources" always maps to HR, anything outside the
/// fixed dictionary (e.g. "Legal") always maps to None.
pub fn map_department(label: &str) -> Option<Department> {
    match label {
        "IT" => Some(Department::It),
        "Human Resources" => Some(Department::Hr),
        "Finance" => Some(Department::Accounts),
        "Procurement" => Some(Department::Purchase),
        "Training" => Some(Department::Training),
        "Administration" => Some(Department::Admin),
        "Engineering" => Some(Department::Engineering),
        "Marketing" => Some(Department::Marketing),
        "Sales" => Some(Department::Sales),
        _ => None,
    }
}

/// Generates a validated onboarding checklist for a role.
///
/// Every returned task carries either a canonical department that exists in
/// the host system or no department at all — never a raw model label.
pub async fn generate_checklist(
    role: &str,
    chat: &dyn ChatModel,
    store: &dyn DocumentStore,
) -> Result<Vec<ChecklistTask>, AppError> {
    let prompt = CHECKLIST_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{departments}", &GENERIC_DEPARTMENTS.join(", "));

    let reply = chat
        .complete(CHECKLIST_SYSTEM, &prompt, CHECKLIST_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Error generating checklist: {e}")))?;

    let raw_tasks: Vec<RawTask> = parse_json_reply(&reply)
        .map_err(|e| AppError::Llm(format!("Error generating checklist: {e}")))?;

    let mut tasks = Vec::with_capacity(raw_tasks.len());
    for raw in raw_tasks {
        let department = match raw.department.as_deref().and_then(map_department) {
            Some(dept) => {
                // The mapped code must also exist as a host document.
                match store.department_exists(dept.code()).await {
                    Ok(true) => Some(dept),
                    Ok(false) => {
                        warn!("Department {} not present in host system", dept.code());
                        None
                    }
                    Err(e) => {
                        warn!("Department lookup failed for {}: {e}", dept.code());
                        None
                    }
                }
            }
            None => {
                if let Some(label) = &raw.department {
                    warn!("Dropping unmapped department label {label:?}");
                }
                None
            }
        };

        tasks.push(ChecklistTask {
            description: raw.description,
            department,
        });
    }

    Ok(tasks)
}
