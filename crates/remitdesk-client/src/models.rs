//! Wire models exchanged with the payment backend

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::types::{AccountType, VendorSource};

/// A payee with banking details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: u64,
    pub name: String,
    pub bank_name: String,
    pub branch_name: String,
    #[serde(default)]
    pub account_type: AccountType,
    pub account_number: String,
    pub account_holder: String,
    /// Provenance tag; manual entries carry no tag on the wire
    #[serde(default)]
    pub source: VendorSource,
    /// Master-data file an uploaded vendor was imported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_code: Option<String>,
}

impl Vendor {
    pub fn is_uploaded(&self) -> bool {
        self.source == VendorSource::Upload
    }

    /// One-line banking summary used in suggestion lists
    pub fn bank_summary(&self) -> String {
        format!("{} {} {}", self.bank_name, self.branch_name, self.account_number)
    }

    /// Case-sensitive substring match over the searchable attributes
    pub fn matches(&self, query: &str) -> bool {
        self.name.contains(query)
            || self.bank_name.contains(query)
            || self.branch_name.contains(query)
            || self.account_number.contains(query)
            || self.account_holder.contains(query)
    }
}

/// Registration payload for `POST /api/vendors`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVendor {
    pub name: String,
    pub bank_name: String,
    pub branch_name: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub account_holder: String,
}

/// Remitting company reference data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemittanceCompany {
    pub name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,
}

impl RemittanceCompany {
    pub fn bank_summary(&self) -> String {
        format!("{} {} {}", self.bank_name, self.branch_name, self.account_number)
    }
}

/// A line item as stored in a payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredItem")]
pub struct PaymentItem {
    pub vendor_id: u64,
    pub vendor_name: String,
    pub amount: i64,
    pub description: String,
    pub remarks: String,
}

/// Item as the backend stores it; older records keep remarks under `note`
#[derive(Deserialize)]
struct StoredItem {
    vendor_id: u64,
    vendor_name: String,
    #[serde(deserialize_with = "amount_from_number_or_text")]
    amount: i64,
    description: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
}

impl From<StoredItem> for PaymentItem {
    fn from(item: StoredItem) -> Self {
        let remarks = item
            .note
            .filter(|note| !note.is_empty())
            .or(item.remarks)
            .unwrap_or_default();
        PaymentItem {
            vendor_id: item.vendor_id,
            vendor_name: item.vendor_name,
            amount: item.amount,
            description: item.description,
            remarks,
        }
    }
}

/// A server-confirmed payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub payment_date: String,
    pub remittance_company: String,
    #[serde(default)]
    pub items: Vec<PaymentItem>,
    #[serde(default)]
    pub created_at: String,
}

impl PaymentRecord {
    pub fn total(&self) -> i64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    /// Payment date as `YYYY/MM/DD`, raw text when it does not parse
    pub fn payment_date_display(&self) -> String {
        NaiveDate::parse_from_str(&self.payment_date, "%Y-%m-%d")
            .map(|d| d.format("%Y/%m/%d").to_string())
            .unwrap_or_else(|_| self.payment_date.clone())
    }

    /// Creation timestamp as `YYYY/MM/DD HH:MM`
    pub fn created_at_display(&self) -> String {
        display_timestamp(&self.created_at)
    }
}

/// Payload for `POST /api/payments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub payment_date: String,
    pub remittance_company: String,
    pub items: Vec<PaymentItem>,
}

/// Result of a successful payment submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
    #[serde(default)]
    pub pdf_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_filename: Option<String>,
    /// Render failure reported alongside an otherwise successful submission
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
}

/// Master-data file held by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub size: u64,
    pub modified: String,
}

impl UploadedFile {
    pub fn modified_display(&self) -> String {
        display_timestamp(&self.modified)
    }
}

/// Result of `POST /api/upload-file`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
    #[serde(default)]
    pub vendor_count: usize,
    #[serde(default)]
    pub message: String,
}

/// Result of a delete call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionReceipt {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupReceipt {
    #[serde(default)]
    pub payments_count: usize,
    #[serde(default)]
    pub vendors_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreReceipt {
    #[serde(default)]
    pub payments_restored: usize,
    #[serde(default)]
    pub vendors_restored: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupFile {
    pub filename: String,
    pub modified: String,
}

impl BackupFile {
    pub fn modified_display(&self) -> String {
        display_timestamp(&self.modified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupStatus {
    #[serde(default)]
    pub backup_count: usize,
    #[serde(default)]
    pub backup_files: Vec<BackupFile>,
}

impl BackupStatus {
    /// The newest `n` files, oldest first (the backend lists oldest first)
    pub fn latest(&self, n: usize) -> &[BackupFile] {
        let start = self.backup_files.len().saturating_sub(n);
        &self.backup_files[start..]
    }
}

/// Binary artifact fetched from a download endpoint
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub body: bytes::Bytes,
}

fn display_timestamp(raw: &str) -> String {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"));
    match parsed {
        Ok(dt) => dt.format("%Y/%m/%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn amount_from_number_or_text<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) => Ok(f.trunc() as i64),
        Raw::Text(s) => s
            .trim()
            .replace(',', "")
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {}", s))),
    }
}
