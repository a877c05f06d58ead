//! Asset Forecaster & Alerter.
//!
//! Flow: aggregate required-asset quantities across upcoming onboardings →
//! resolve each asset type to an inventory item code → compare demand with
//! on-hand stock → on shortfall, alert and open a draft purchase request.
//!
//! The pipeline never aborts on a single asset: a failed item lookup or
//! stock read is logged and that asset skipped, the rest still processed.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::erp::{DocumentStore, ErpError, InventoryService};
use crate::models::OnboardingRecord;
use crate::notify::{Notifier, NotifyOutcome};

pub mod alerts;

/// Which trigger produced the alert. The daily timer path is alert-only;
/// the save-hook path also opens draft purchase requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    SaveHook,
    Daily,
}

impl AlertKind {
    fn creates_requests(&self) -> bool {
        matches!(self, AlertKind::SaveHook)
    }
}

/// What happened for one asset type in shortfall.
#[derive(Debug, Clone, Serialize)]
pub struct ShortageReport {
    pub asset_type: String,
    pub item_code: String,
    pub required: u32,
    pub available: u32,
    pub shortage: u32,
    pub alert: NotifyOutcome,
    /// Draft purchase request name, when creation was attempted and succeeded.
    pub request_name: Option<String>,
    pub confirmation: Option<NotifyOutcome>,
}

/// Sums required-asset quantities per asset type. Associative and
/// order-independent: any record order yields the same totals.
pub fn aggregate_demand(records: &[OnboardingRecord]) -> HashMap<String, u32> {
    let mut demand: HashMap<String, u32> = HashMap::new();
    for record in records {
        for asset in &record.required_assets {
            *demand.entry(asset.asset_type.clone()).or_insert(0) += asset.quantity;
        }
    }
    demand
}

/// Aggregated demand from onboardings whose joining date falls inside
/// `today .. today + window_days` (status Completed excluded by the store).
pub async fn upcoming_demand(
    store: &dyn DocumentStore,
    window_days: i64,
) -> Result<HashMap<String, u32>, ErpError> {
    let today = Local::now().date_naive();
    let horizon = today + Duration::days(window_days);
    let records = store.upcoming_onboardings(today, horizon).await?;
    info!(
        "Forecasting over {} onboarding record(s) joining by {horizon}",
        records.len()
    );
    Ok(aggregate_demand(&records))
}

/// Runs the shortage check over an aggregated demand map.
///
/// Per asset type in shortfall: exactly one alert is sent before any request
/// creation, and a confirmation alert follows only if creation succeeds.
/// With enough stock for every asset, there are zero side effects.
pub async fn check_and_alert(
    demand: &HashMap<String, u32>,
    inventory: &dyn InventoryService,
    notifier: &dyn Notifier,
    kind: AlertKind,
) -> Vec<ShortageReport> {
    let mut reports = Vec::new();

    // Deterministic iteration order so alert sequences are stable.
    let mut asset_names: Vec<&String> = demand.keys().collect();
    asset_names.sort();

    for asset_name in asset_names {
        let required = demand[asset_name];

        let item_code = match inventory.resolve_item_code(asset_name).await {
            Ok(Some(code)) => code,
            Ok(None) => {
                warn!("Item not found for asset: {asset_name}");
                continue;
            }
            Err(e) => {
                warn!("Item lookup failed for asset {asset_name}: {e}");
                continue;
            }
        };

        let available = match inventory.available_stock(&item_code).await {
            Ok(qty) => qty,
            Err(e) => {
                warn!("Stock lookup failed for item {item_code}: {e}");
                continue;
            }
        };

        if available >= required {
            continue;
        }
        let shortage = required - available;

        let message = alerts::shortage_alert(kind, asset_name, required, available, shortage);
        let alert = notifier.send(&message).await;

        let (request_name, confirmation) = if kind.creates_requests() {
            match inventory.create_purchase_request(&item_code, shortage).await {
                Ok(name) => {
                    let confirmed = alerts::with_request_confirmation(&message, &name);
                    let outcome = notifier.send(&confirmed).await;
                    (Some(name), Some(outcome))
                }
                Err(e) => {
                    warn!("Error creating material request for {item_code}: {e}");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        reports.push(ShortageReport {
            asset_type: asset_name.clone(),
            item_code,
            required,
            available,
            shortage,
            alert,
            request_name,
            confirmation,
        });
    }

    reports
}

/// Best-effort duplicate-execution guard for the save hook.
///
/// Keyed by (record name, date) and held in process memory only: it does
/// not survive restarts, and two instances do not share it. Duplicate
/// draft requests across restarts remain possible.
#[derive(Default)]
pub struct ShortageGuard {
    seen: Mutex<HashSet<(String, NaiveDate)>>,
}

impl ShortageGuard {
    /// True on the first call for this record today; false on repeats.
    /// Entries for past days are dropped on the way in, so the set holds
    /// at most one day's worth of records.
    pub fn first_run(&self, record_name: &str, date: NaiveDate) -> bool {
        let mut seen = self.seen.lock().unwrap();
        seen.retain(|(_, d)| *d >= date);
        seen.insert((record_name.to_string(), date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erp::testutil::InMemoryErp;
    use crate::models::RequiredAsset;
    use crate::notify::testutil::{FailingNotifier, RecordingNotifier};

    fn record(name: &str, assets: &[(&str, u32)]) -> OnboardingRecord {
        OnboardingRecord {
            name: name.to_string(),
            employee: None,
            job_title: None,
            status: "Pending".to_string(),
            candidate_comment: None,
            risk_level: None,
            joining_date: None,
            checklist: vec![],
            required_assets: assets
                .iter()
                .map(|(asset_type, quantity)| RequiredAsset {
                    asset_type: asset_type.to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_aggregation_sums_per_asset_type() {
        let records = vec![
            record("EOT-0001", &[("Laptop", 2), ("Chair", 1)]),
            record("EOT-0002", &[("Laptop", 3)]),
        ];
        let demand = aggregate_demand(&records);
        assert_eq!(demand["Laptop"], 5);
        assert_eq!(demand["Chair"], 1);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let a = record("EOT-0001", &[("Laptop", 2), ("Monitor", 1)]);
        let b = record("EOT-0002", &[("Monitor", 2), ("Laptop", 3)]);
        let forward = aggregate_demand(&[a.clone(), b.clone()]);
        let reverse = aggregate_demand(&[b, a]);
        assert_eq!(forward, reverse);
    }

    #[tokio::test]
    async fn test_sufficient_stock_means_zero_side_effects() {
        let mut erp = InMemoryErp::default();
        erp.items_by_name
            .insert("Laptop".to_string(), "ITEM-LAPTOP".to_string());
        erp.stock.insert("ITEM-LAPTOP".to_string(), 5);

        let notifier = RecordingNotifier::default();
        let demand = HashMap::from([("Laptop".to_string(), 2)]);

        let reports = check_and_alert(&demand, &erp, &notifier, AlertKind::SaveHook).await;

        assert!(reports.is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(erp.request_count(), 0);
    }

    #[tokio::test]
    async fn test_shortage_alerts_then_creates_then_confirms() {
        let mut erp = InMemoryErp::default();
        erp.items_by_name
            .insert("Laptop".to_string(), "ITEM-LAPTOP".to_string());
        erp.stock.insert("ITEM-LAPTOP".to_string(), 2);

        let notifier = RecordingNotifier::default();
        let demand = HashMap::from([("Laptop".to_string(), 5)]);

        let reports = check_and_alert(&demand, &erp, &notifier, AlertKind::SaveHook).await;

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.shortage, 3);
        assert_eq!(report.request_name.as_deref(), Some("MAT-MR-0001"));

        let sent = notifier.sent.lock().unwrap();
        // First alert before any request creation, confirmation after.
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Shortage: 3"));
        assert!(!sent[0].contains("MAT-MR-0001"));
        assert!(sent[1].contains("MAT-MR-0001"));

        let created = erp.created_requests.lock().unwrap();
        assert_eq!(created.as_slice(), &[("ITEM-LAPTOP".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_no_confirmation_when_request_creation_fails() {
        let mut erp = InMemoryErp::default();
        erp.items_by_name
            .insert("Laptop".to_string(), "ITEM-LAPTOP".to_string());
        erp.stock.insert("ITEM-LAPTOP".to_string(), 0);
        erp.fail_request_creation = true;

        let notifier = RecordingNotifier::default();
        let demand = HashMap::from([("Laptop".to_string(), 1)]);

        let reports = check_and_alert(&demand, &erp, &notifier, AlertKind::SaveHook).await;

        assert_eq!(reports.len(), 1);
        assert!(reports[0].request_name.is_none());
        assert!(reports[0].confirmation.is_none());
        // Only the shortage alert went out.
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_daily_kind_alerts_without_creating_requests() {
        let mut erp = InMemoryErp::default();
        erp.items_by_name
            .insert("Chair".to_string(), "ITEM-CHAIR".to_string());

        let notifier = RecordingNotifier::default();
        let demand = HashMap::from([("Chair".to_string(), 4)]);

        let reports = check_and_alert(&demand, &erp, &notifier, AlertKind::Daily).await;

        assert_eq!(reports.len(), 1);
        assert!(reports[0].request_name.is_none());
        assert_eq!(erp.request_count(), 0);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Daily Forecast Alert"));
    }

    #[tokio::test]
    async fn test_unresolvable_asset_is_skipped_others_processed() {
        let mut erp = InMemoryErp::default();
        erp.items_by_name
            .insert("Laptop".to_string(), "ITEM-LAPTOP".to_string());
        // "Standing Desk" resolves to nothing.

        let notifier = RecordingNotifier::default();
        let demand = HashMap::from([
            ("Standing Desk".to_string(), 2),
            ("Laptop".to_string(), 1),
        ]);

        let reports = check_and_alert(&demand, &erp, &notifier, AlertKind::SaveHook).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].asset_type, "Laptop");
    }

    #[tokio::test]
    async fn test_asset_name_that_is_an_item_code_resolves_directly() {
        let mut erp = InMemoryErp::default();
        erp.item_codes.insert("ITEM-DOCK".to_string());

        let notifier = RecordingNotifier::default();
        let demand = HashMap::from([("ITEM-DOCK".to_string(), 2)]);

        let reports = check_and_alert(&demand, &erp, &notifier, AlertKind::SaveHook).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].item_code, "ITEM-DOCK");
    }

    #[tokio::test]
    async fn test_failed_alert_still_reported() {
        let mut erp = InMemoryErp::default();
        erp.items_by_name
            .insert("Laptop".to_string(), "ITEM-LAPTOP".to_string());

        let demand = HashMap::from([("Laptop".to_string(), 1)]);
        let reports = check_and_alert(&demand, &erp, &FailingNotifier, AlertKind::SaveHook).await;

        assert_eq!(reports.len(), 1);
        assert!(!reports[0].alert.is_delivered());
        // The draft request is still attempted; notifications are best-effort.
        assert_eq!(erp.request_count(), 1);
    }

    #[test]
    fn test_guard_allows_first_run_only() {
        let guard = ShortageGuard::default();
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert!(guard.first_run("EOT-0001", date));
        assert!(!guard.first_run("EOT-0001", date));
        // A different record or day is a fresh run.
        assert!(guard.first_run("EOT-0002", date));
        assert!(guard.first_run("EOT-0001", date.succ_opt().unwrap()));
    }

    #[test]
    fn test_guard_drops_entries_from_past_days() {
        let guard = ShortageGuard::default();
        let yesterday = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let today = yesterday.succ_opt().unwrap();

        assert!(guard.first_run("EOT-0001", yesterday));
        assert!(guard.first_run("EOT-0002", today));
        // Yesterday's entry was pruned, so re-running it is fresh again
        // and the set never accumulates history.
        assert!(guard.first_run("EOT-0001", yesterday));
        assert_eq!(guard.seen.lock().unwrap().len(), 2);
    }
}
