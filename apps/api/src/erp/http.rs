//! HTTP implementation of the ERP seams against the host REST document API.
//!
//! Conventions of the host API:
//! - documents live at `/api/resource/{doctype}/{name}`, lists at
//!   `/api/resource/{doctype}?filters=...&fields=...`;
//! - every payload is wrapped in `{"data": ...}`;
//! - authentication is a static `token` Authorization header.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::erp::{DocumentStore, ErpError, InventoryService};
use crate::models::{ChecklistTask, Department, OnboardingRecord, RequiredAsset, RiskLevel};

const TRACKER_DOCTYPE: &str = "Employee Onboarding Tracker";

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Wire form of the tracker document. Child-table field names follow the
/// host schema (`task_description`), not the domain model.
#[derive(Debug, Serialize, Deserialize)]
struct TrackerDoc {
    name: String,
    #[serde(default)]
    employee: Option<String>,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    candidate_comment: Option<String>,
    #[serde(default)]
    risk_level: Option<String>,
    #[serde(default)]
    joining_date: Option<NaiveDate>,
    #[serde(default)]
    checklist: Vec<TrackerTask>,
    #[serde(default)]
    required_assets: Vec<TrackerAsset>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackerTask {
    task_description: String,
    #[serde(default)]
    department: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackerAsset {
    asset_type: String,
    #[serde(default)]
    quantity: f64,
}

#[derive(Debug, Deserialize)]
struct NamedRow {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BinRow {
    #[serde(default)]
    actual_qty: f64,
}

#[derive(Debug, Deserialize)]
struct EmployeeDoc {
    #[serde(default)]
    date_of_joining: Option<NaiveDate>,
}

impl From<TrackerDoc> for OnboardingRecord {
    fn from(doc: TrackerDoc) -> Self {
        OnboardingRecord {
            name: doc.name,
            employee: doc.employee,
            job_title: doc.job_title,
            status: doc.status,
            candidate_comment: doc.candidate_comment,
            // An unrecognized stored label is treated as unclassified.
            risk_level: doc.risk_level.and_then(|r| r.parse::<RiskLevel>().ok()),
            joining_date: doc.joining_date,
            checklist: doc
                .checklist
                .into_iter()
                .map(|t| ChecklistTask {
                    description: t.task_description,
                    department: t.department.as_deref().and_then(Department::from_code),
                })
                .collect(),
            required_assets: doc
                .required_assets
                .into_iter()
                .map(|a| RequiredAsset {
                    asset_type: a.asset_type,
                    quantity: a.quantity.max(0.0) as u32,
                })
                .collect(),
        }
    }
}

impl From<&OnboardingRecord> for TrackerDoc {
    fn from(record: &OnboardingRecord) -> Self {
        TrackerDoc {
            name: record.name.clone(),
            employee: record.employee.clone(),
            job_title: record.job_title.clone(),
            status: record.status.clone(),
            candidate_comment: record.candidate_comment.clone(),
            risk_level: record.risk_level.map(|r| format!("{r:?}")),
            joining_date: record.joining_date,
            checklist: record
                .checklist
                .iter()
                .map(|t| TrackerTask {
                    task_description: t.description.clone(),
                    department: t.department.map(|d| d.code().to_string()),
                })
                .collect(),
            required_assets: record
                .required_assets
                .iter()
                .map(|a| TrackerAsset {
                    asset_type: a.asset_type.clone(),
                    quantity: a.quantity as f64,
                })
                .collect(),
        }
    }
}

/// REST client for the host ERP. Implements both seams.
#[derive(Clone)]
pub struct HttpErpStore {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpErpStore {
    pub fn new(base_url: String, api_token: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn resource_url(&self, doctype: &str, name: Option<&str>) -> String {
        let doctype = doctype.replace(' ', "%20");
        match name {
            Some(n) => format!("{}/api/resource/{}/{}", self.base_url, doctype, n.replace(' ', "%20")),
            None => format!("{}/api/resource/{}", self.base_url, doctype),
        }
    }

    async fn get_doc<T: DeserializeOwned>(
        &self,
        doctype: &str,
        name: &str,
    ) -> Result<T, ErpError> {
        let response = self
            .client
            .get(self.resource_url(doctype, Some(name)))
            .header("Authorization", format!("token {}", self.api_token))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ErpError::NotFound(format!("{doctype} {name}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn list_docs<T: DeserializeOwned>(
        &self,
        doctype: &str,
        filters: serde_json::Value,
        fields: &[&str],
    ) -> Result<Vec<T>, ErpError> {
        let response = self
            .client
            .get(self.resource_url(doctype, None))
            .header("Authorization", format!("token {}", self.api_token))
            .query(&[
                ("filters", filters.to_string()),
                ("fields", json!(fields).to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: DataEnvelope<Vec<T>> = response.json().await?;
        Ok(envelope.data)
    }

    async fn doc_exists(&self, doctype: &str, name: &str) -> Result<bool, ErpError> {
        match self.get_doc::<serde_json::Value>(doctype, name).await {
            Ok(_) => Ok(true),
            Err(ErpError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl DocumentStore for HttpErpStore {
    async fn get_onboarding(&self, name: &str) -> Result<OnboardingRecord, ErpError> {
        let doc: TrackerDoc = self.get_doc(TRACKER_DOCTYPE, name).await?;
        Ok(doc.into())
    }

    async fn update_onboarding(&self, record: &OnboardingRecord) -> Result<(), ErpError> {
        let doc = TrackerDoc::from(record);
        let response = self
            .client
            .put(self.resource_url(TRACKER_DOCTYPE, Some(&record.name)))
            .header("Authorization", format!("token {}", self.api_token))
            .json(&doc)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn upcoming_onboardings(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OnboardingRecord>, ErpError> {
        // The list endpoint does not return child tables, so list names
        // first and fetch each full document.
        let filters = json!([
            ["joining_date", "between", [from.to_string(), to.to_string()]],
            ["status", "!=", "Completed"]
        ]);
        let rows: Vec<NamedRow> = self.list_docs(TRACKER_DOCTYPE, filters, &["name"]).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.get_onboarding(&row.name).await?);
        }
        Ok(records)
    }

    async fn employee_joining_date(
        &self,
        employee: &str,
    ) -> Result<Option<NaiveDate>, ErpError> {
        let doc: EmployeeDoc = self.get_doc("Employee", employee).await?;
        Ok(doc.date_of_joining)
    }

    async fn department_exists(&self, code: &str) -> Result<bool, ErpError> {
        self.doc_exists("Department", code).await
    }
}

#[async_trait]
impl InventoryService for HttpErpStore {
    async fn resolve_item_code(&self, asset_name: &str) -> Result<Option<String>, ErpError> {
        // Exact item-name match first; the item code is the document name.
        let filters = json!([["item_name", "=", asset_name]]);
        let rows: Vec<NamedRow> = self.list_docs("Item", filters, &["name"]).await?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(Some(row.name));
        }

        // Fallback: the asset name may itself be an item code.
        if self.doc_exists("Item", asset_name).await? {
            return Ok(Some(asset_name.to_string()));
        }

        Ok(None)
    }

    async fn available_stock(&self, item_code: &str) -> Result<u32, ErpError> {
        let filters = json!([["item_code", "=", item_code]]);
        let bins: Vec<BinRow> = self.list_docs("Bin", filters, &["actual_qty"]).await?;
        // No bin means the item has never been stocked.
        let qty: f64 = bins.iter().map(|b| b.actual_qty).sum();
        Ok(qty.max(0.0) as u32)
    }

    async fn create_purchase_request(
        &self,
        item_code: &str,
        quantity: u32,
    ) -> Result<String, ErpError> {
        let today = Local::now().date_naive();
        let body = json!({
            "material_request_type": "Purchase",
            "schedule_date": today.to_string(),
            "items": [{
                "item_code": item_code,
                "qty": quantity,
                "schedule_date": today.to_string(),
            }],
        });

        let response = self
            .client
            .post(self.resource_url("Material Request", None))
            .header("Authorization", format!("token {}", self.api_token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: DataEnvelope<NamedRow> = response.json().await?;
        info!(
            "Draft material request {} created for {} x{}",
            envelope.data.name, item_code, quantity
        );
        Ok(envelope.data.name)
    }
}
