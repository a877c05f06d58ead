use std::sync::Arc;

use crate::config::Config;
use crate::erp::{DocumentStore, InventoryService};
use crate::forecast::ShortageGuard;
use crate::llm_client::ChatModel;
use crate::notify::Notifier;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external effect goes through a trait object so tests can swap in
/// in-memory doubles; nothing here is process-global.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<dyn ChatModel>,
    pub store: Arc<dyn DocumentStore>,
    pub inventory: Arc<dyn InventoryService>,
    pub notifier: Arc<dyn Notifier>,
    /// Duplicate-execution guard for the save-hook shortage check.
    pub shortage_guard: Arc<ShortageGuard>,
    pub config: Config,
}
