//! Axum route handlers for the hook and automation endpoints.

use axum::{extract::State, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::checklist::generate_checklist;
use crate::errors::AppError;
use crate::forecast::{aggregate_demand, check_and_alert, upcoming_demand, AlertKind, ShortageReport};
use crate::models::ChecklistTask;
use crate::risk::{classify_risk, RiskAssessment};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of every document hook: the host document name.
#[derive(Debug, Deserialize)]
pub struct HookRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateChecklistRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateChecklistResponse {
    pub tasks: Vec<ChecklistTask>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRiskRequest {
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct OnboardingSavedResponse {
    pub name: String,
    pub joining_date_set: bool,
    pub checklist_tasks_added: usize,
    pub risk: Option<RiskAssessment>,
    /// False when the per-(record, date) guard suppressed a repeat run.
    pub shortage_check_run: bool,
    pub shortages: Vec<ShortageReport>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub demand: HashMap<String, u32>,
    pub shortages: Vec<ShortageReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/hooks/onboarding-created
///
/// Document-created hook. Log-only, matching the original workflow.
pub async fn handle_onboarding_created(
    Json(request): Json<HookRequest>,
) -> Json<Value> {
    info!("New onboarding record created: {}", request.name);
    Json(json!({ "name": request.name, "status": "logged" }))
}

/// POST /api/v1/hooks/onboarding-saved
///
/// Document-save hook: fills joining date, checklist, and risk level where
/// missing, writes the record back, then runs the shortage check once per
/// record per day. Enrichment failures are logged and skipped — the save
/// itself never fails because of them.
pub async fn handle_onboarding_saved(
    State(state): State<AppState>,
    Json(request): Json<HookRequest>,
) -> Result<Json<OnboardingSavedResponse>, AppError> {
    let mut record = state
        .store
        .get_onboarding(&request.name)
        .await
        .map_err(|_| AppError::NotFound(format!("Onboarding record {}", request.name)))?;

    let mut enriched = false;

    // Joining date from the linked employee, if missing.
    let mut joining_date_set = false;
    if record.joining_date.is_none() {
        if let Some(employee) = record.employee.clone() {
            match state.store.employee_joining_date(&employee).await {
                Ok(Some(date)) => {
                    record.joining_date = Some(date);
                    joining_date_set = true;
                    enriched = true;
                }
                Ok(None) => {}
                Err(e) => warn!("Error setting joining date for {}: {e}", record.name),
            }
        }
    }

    // Checklist, if empty and a job title is present. Only tasks with a
    // valid department are appended; a generation failure is logged and
    // the record still saves.
    let mut checklist_tasks_added = 0;
    if record.checklist.is_empty() {
        if let Some(role) = record.job_title.clone() {
            match generate_checklist(&role, state.chat.as_ref(), state.store.as_ref()).await {
                Ok(tasks) => {
                    let valid: Vec<ChecklistTask> =
                        tasks.into_iter().filter(|t| t.department.is_some()).collect();
                    checklist_tasks_added = valid.len();
                    record.checklist.extend(valid);
                    enriched |= checklist_tasks_added > 0;
                }
                Err(e) => warn!("Error generating checklist for {}: {e}", record.name),
            }
        }
    }

    // Risk level, if a comment is present and none set. Total by fail-open.
    let mut risk = None;
    if record.risk_level.is_none() {
        if let Some(comment) = record.candidate_comment.clone() {
            if !comment.trim().is_empty() {
                let assessment = classify_risk(&comment, state.chat.as_ref()).await;
                record.risk_level = Some(assessment.level);
                enriched = true;
                risk = Some(assessment);
            }
        }
    }

    if enriched {
        if let Err(e) = state.store.update_onboarding(&record).await {
            warn!("Error saving enriched record {}: {e}", record.name);
        }
    }

    // Shortage check, guarded against duplicate execution for this record today.
    let today = Local::now().date_naive();
    let shortage_check_run = state.shortage_guard.first_run(&record.name, today);
    let shortages = if shortage_check_run {
        match upcoming_demand(state.store.as_ref(), state.config.forecast_window_days).await {
            Ok(demand) => {
                check_and_alert(
                    &demand,
                    state.inventory.as_ref(),
                    state.notifier.as_ref(),
                    AlertKind::SaveHook,
                )
                .await
            }
            Err(e) => {
                warn!("Error in shortage check for {}: {e}", record.name);
                vec![]
            }
        }
    } else {
        info!("Shortage check already ran for {} today; skipping", record.name);
        vec![]
    };

    Ok(Json(OnboardingSavedResponse {
        name: record.name,
        joining_date_set,
        checklist_tasks_added,
        risk,
        shortage_check_run,
        shortages,
    }))
}

/// POST /api/v1/forecast/daily
///
/// Daily timer target: forecast demand over the lookahead window and alert
/// on expected shortages. Alert-only — no draft requests from this path.
pub async fn handle_daily_forecast(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, AppError> {
    info!("Running daily onboarding forecast...");
    let demand = upcoming_demand(state.store.as_ref(), state.config.forecast_window_days).await?;

    let shortages = check_and_alert(
        &demand,
        state.inventory.as_ref(),
        state.notifier.as_ref(),
        AlertKind::Daily,
    )
    .await;

    Ok(Json(ForecastResponse { demand, shortages }))
}

/// POST /api/v1/assets/check
///
/// Manual shortage check for a single record's required assets, with draft
/// request creation. The whitelisted per-document action of the original.
pub async fn handle_asset_check(
    State(state): State<AppState>,
    Json(request): Json<HookRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    let record = state
        .store
        .get_onboarding(&request.name)
        .await
        .map_err(|_| AppError::NotFound(format!("Onboarding record {}", request.name)))?;

    let demand = aggregate_demand(std::slice::from_ref(&record));
    let shortages = check_and_alert(
        &demand,
        state.inventory.as_ref(),
        state.notifier.as_ref(),
        AlertKind::SaveHook,
    )
    .await;

    Ok(Json(ForecastResponse { demand, shortages }))
}

/// POST /api/v1/checklist/generate
///
/// Direct checklist generation. The one user-facing hard failure: a model
/// or parse error is returned as an error response.
pub async fn handle_generate_checklist(
    State(state): State<AppState>,
    Json(request): Json<GenerateChecklistRequest>,
) -> Result<Json<GenerateChecklistResponse>, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }

    let tasks = generate_checklist(&request.role, state.chat.as_ref(), state.store.as_ref()).await?;

    Ok(Json(GenerateChecklistResponse { tasks }))
}

/// POST /api/v1/risk/classify
///
/// Direct risk classification. Always succeeds; the response says whether
/// the level was classified or defaulted.
pub async fn handle_classify_risk(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRiskRequest>,
) -> Result<Json<RiskAssessment>, AppError> {
    if request.comment.trim().is_empty() {
        return Err(AppError::Validation("comment cannot be empty".to_string()));
    }

    let assessment = classify_risk(&request.comment, state.chat.as_ref()).await;
    Ok(Json(assessment))
}
