//! In-memory ERP double shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::erp::{DocumentStore, ErpError, InventoryService};
use crate::models::OnboardingRecord;

/// In-memory implementation of both ERP seams. Construct, seed the public
/// fields, and pass by reference; mutations are observable afterwards.
#[derive(Default)]
pub struct InMemoryErp {
    pub records: Mutex<HashMap<String, OnboardingRecord>>,
    pub employees: HashMap<String, NaiveDate>,
    pub departments: HashSet<String>,
    /// item_name -> item_code
    pub items_by_name: HashMap<String, String>,
    pub item_codes: HashSet<String>,
    /// item_code -> on-hand quantity
    pub stock: HashMap<String, u32>,
    pub created_requests: Mutex<Vec<(String, u32)>>,
    pub fail_request_creation: bool,
    pub fail_employee_lookup: bool,
}

impl InMemoryErp {
    /// Double where every canonical department exists.
    pub fn with_all_departments() -> Self {
        let mut erp = Self::default();
        for code in [
            "IT",
            "HR",
            "Accounts",
            "Purchase",
            "Training",
            "Admin",
            "Engineering",
            "Marketing",
            "Sales",
        ] {
            erp.departments.insert(code.to_string());
        }
        erp
    }

    pub fn insert_record(&self, record: OnboardingRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.name.clone(), record);
    }

    pub fn record(&self, name: &str) -> Option<OnboardingRecord> {
        self.records.lock().unwrap().get(name).cloned()
    }

    pub fn request_count(&self) -> usize {
        self.created_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryErp {
    async fn get_onboarding(&self, name: &str) -> Result<OnboardingRecord, ErpError> {
        self.record(name)
            .ok_or_else(|| ErpError::NotFound(name.to_string()))
    }

    async fn update_onboarding(&self, record: &OnboardingRecord) -> Result<(), ErpError> {
        self.insert_record(record.clone());
        Ok(())
    }

    async fn upcoming_onboardings(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OnboardingRecord>, ErpError> {
        let records = self.records.lock().unwrap();
        let mut upcoming: Vec<OnboardingRecord> = records
            .values()
            .filter(|r| {
                r.status != "Completed"
                    && r.joining_date.is_some_and(|d| d >= from && d <= to)
            })
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(upcoming)
    }

    async fn employee_joining_date(
        &self,
        employee: &str,
    ) -> Result<Option<NaiveDate>, ErpError> {
        if self.fail_employee_lookup {
            return Err(ErpError::Status {
                status: 500,
                body: "employee lookup failed".to_string(),
            });
        }
        Ok(self.employees.get(employee).copied())
    }

    async fn department_exists(&self, code: &str) -> Result<bool, ErpError> {
        Ok(self.departments.contains(code))
    }
}

#[async_trait]
impl InventoryService for InMemoryErp {
    async fn resolve_item_code(&self, asset_name: &str) -> Result<Option<String>, ErpError> {
        if let Some(code) = self.items_by_name.get(asset_name) {
            return Ok(Some(code.clone()));
        }
        if self.item_codes.contains(asset_name) {
            return Ok(Some(asset_name.to_string()));
        }
        Ok(None)
    }

    async fn available_stock(&self, item_code: &str) -> Result<u32, ErpError> {
        Ok(self.stock.get(item_code).copied().unwrap_or(0))
    }

    async fn create_purchase_request(
        &self,
        item_code: &str,
        quantity: u32,
    ) -> Result<String, ErpError> {
        if self.fail_request_creation {
            return Err(ErpError::Status {
                status: 403,
                body: "request creation rejected".to_string(),
            });
        }
        let mut created = self.created_requests.lock().unwrap();
        created.push((item_code.to_string(), quantity));
        Ok(format!("MAT-MR-{:04}", created.len()))
    }
}
