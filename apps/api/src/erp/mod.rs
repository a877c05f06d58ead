//! Seams over the host ERP platform.
//!
//! The document store and inventory subsystem are owned by the platform;
//! this service only reads records, writes back enrichments, and opens
//! draft purchase requests. Both concerns are traits so hooks and the
//! forecast pipeline can run against in-memory doubles in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::OnboardingRecord;

pub mod http;
#[cfg(test)]
pub mod testutil;

pub use http::HttpErpStore;

#[derive(Debug, Error)]
pub enum ErpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ERP API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    NotFound(String),
}

/// Read/write access to host documents used by the onboarding flow.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_onboarding(&self, name: &str) -> Result<OnboardingRecord, ErpError>;

    /// Writes back the enriched record (joining date, checklist, risk level).
    async fn update_onboarding(&self, record: &OnboardingRecord) -> Result<(), ErpError>;

    /// Onboarding records with a joining date inside `[from, to]` and a
    /// status other than Completed.
    async fn upcoming_onboardings(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OnboardingRecord>, ErpError>;

    /// The linked employee's date of joining, if recorded.
    async fn employee_joining_date(&self, employee: &str)
        -> Result<Option<NaiveDate>, ErpError>;

    /// Whether a department document with this code exists in the host system.
    async fn department_exists(&self, code: &str) -> Result<bool, ErpError>;
}

/// Read access to stock levels plus draft purchase request creation.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Resolves an asset type name to an inventory item code:
    /// exact item-name match first, then direct item-code match.
    /// `None` means the asset cannot be procured through the host inventory.
    async fn resolve_item_code(&self, asset_name: &str) -> Result<Option<String>, ErpError>;

    /// Current on-hand quantity for an item code. A missing bin is zero stock.
    async fn available_stock(&self, item_code: &str) -> Result<u32, ErpError>;

    /// Creates a draft purchase-type material request and returns its
    /// document name. Not idempotent: two calls create two drafts.
    async fn create_purchase_request(
        &self,
        item_code: &str,
        quantity: u32,
    ) -> Result<String, ErpError>;
}
