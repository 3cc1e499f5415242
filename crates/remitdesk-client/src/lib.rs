//! REST client for the payment management backend
//!
//! The backend owns persistence, PDF rendering, transfer files and backups.
//! Everything here is a thin typed wrapper around its endpoints, behind the
//! [`PaymentBackend`] trait so the session layer can run against either the
//! real HTTP backend or the in-memory one.

use async_trait::async_trait;
use std::sync::Arc;

pub mod endpoints;
pub mod error;
pub mod http;
pub mod memory;
pub mod models;
pub mod types;

pub use endpoints::Artifact;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use models::{
    ActionReceipt, BackupFile, BackupReceipt, BackupStatus, Download, NewPayment, NewVendor,
    PaymentItem, PaymentReceipt, PaymentRecord, RemittanceCompany, RestoreReceipt, UploadReceipt,
    UploadedFile, Vendor,
};
pub use types::{AccountType, VendorSource};

// ==================== Backend Trait ====================

/// Backend reference type
pub type BackendRef = Arc<dyn PaymentBackend>;

/// Operations offered by the payment backend
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    /// `GET /api/vendors`
    async fn list_vendors(&self) -> ClientResult<Vec<Vendor>>;

    /// `POST /api/vendors`
    async fn create_vendor(&self, vendor: &NewVendor) -> ClientResult<Vendor>;

    /// `GET /api/vendors/search?q=`
    async fn search_vendors(&self, query: &str) -> ClientResult<Vec<Vendor>>;

    /// `GET /api/companies`
    async fn list_companies(&self) -> ClientResult<Vec<RemittanceCompany>>;

    /// `GET /api/payments`
    async fn list_payments(&self) -> ClientResult<Vec<PaymentRecord>>;

    /// `GET /api/payments/:id`
    async fn get_payment(&self, payment_id: &str) -> ClientResult<PaymentRecord>;

    /// `POST /api/payments`
    async fn create_payment(&self, payment: &NewPayment) -> ClientResult<PaymentReceipt>;

    /// `DELETE /api/payments/:id`
    async fn delete_payment(&self, payment_id: &str) -> ClientResult<ActionReceipt>;

    /// `GET /api/payments/:id/pdf` or `/transfer`
    async fn download(&self, artifact: Artifact, payment_id: &str) -> ClientResult<Download>;

    /// `POST /api/upload-file` (multipart field `file`)
    async fn upload_file(&self, filename: &str, content: Vec<u8>) -> ClientResult<UploadReceipt>;

    /// `GET /api/upload-files`
    async fn list_uploaded_files(&self) -> ClientResult<Vec<UploadedFile>>;

    /// `DELETE /api/delete-file/:filename`
    async fn delete_uploaded_file(&self, filename: &str) -> ClientResult<ActionReceipt>;

    /// `POST /api/backup/create`
    async fn create_backup(&self) -> ClientResult<BackupReceipt>;

    /// `POST /api/backup/restore`
    async fn restore_backup(&self) -> ClientResult<RestoreReceipt>;

    /// `GET /api/backup/status`
    async fn backup_status(&self) -> ClientResult<BackupStatus>;
}
