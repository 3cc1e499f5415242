//! In-process backend
//!
//! Keeps vendors, payments, uploads and backups in memory and answers the
//! same way the HTTP backend does. Used by the test suites and for running
//! the console without a backend.

use async_trait::async_trait;
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::endpoints::Artifact;
use crate::error::{ClientError, ClientResult};
use crate::models::*;
use crate::types::VendorSource;
use crate::PaymentBackend;

const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct Snapshot {
    filename: String,
    modified: String,
    vendors: Vec<Vendor>,
    payments: Vec<PaymentRecord>,
}

#[derive(Debug, Default)]
struct Store {
    vendors: Vec<Vendor>,
    companies: Vec<RemittanceCompany>,
    payments: Vec<PaymentRecord>,
    files: Vec<UploadedFile>,
    backups: Vec<Snapshot>,
}

#[derive(Debug)]
pub struct MemoryBackend {
    store: Mutex<Store>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    render_pdf: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            calls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            render_pdf: AtomicBool::new(true),
        }
    }

    pub fn with_vendors(self, vendors: Vec<Vendor>) -> Self {
        self.lock().vendors = vendors;
        self
    }

    pub fn with_companies(self, companies: Vec<RemittanceCompany>) -> Self {
        self.lock().companies = companies;
        self
    }

    pub fn with_payments(self, payments: Vec<PaymentRecord>) -> Self {
        self.lock().payments = payments;
        self
    }

    /// Make every call fail with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Toggle whether submissions report a rendered PDF
    pub fn set_pdf_rendering(&self, enabled: bool) {
        self.render_pdf.store(enabled, Ordering::SeqCst);
    }

    /// Names of the operations invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn payments(&self) -> Vec<PaymentRecord> {
        self.lock().payments.clone()
    }

    pub fn vendors(&self) -> Vec<Vendor> {
        self.lock().vendors.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, operation: &str) -> ClientResult<MutexGuard<'_, Store>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(operation.to_string());
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Transport { message: "backend offline".to_string() });
        }
        Ok(self.lock())
    }

    fn next_payment_id(store: &Store) -> String {
        let base = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut id = base.clone();
        let mut n = 1;
        while store.payments.iter().any(|p| p.id == id) {
            id = format!("{}_{}", base, n);
            n += 1;
        }
        id
    }
}

fn not_found(message: &str) -> ClientError {
    ClientError::Status { status: 404, message: message.to_string() }
}

fn now_iso() -> String {
    Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[async_trait]
impl PaymentBackend for MemoryBackend {
    async fn list_vendors(&self) -> ClientResult<Vec<Vendor>> {
        Ok(self.enter("list_vendors")?.vendors.clone())
    }

    async fn create_vendor(&self, vendor: &NewVendor) -> ClientResult<Vendor> {
        let mut store = self.enter("create_vendor")?;
        let created = Vendor {
            id: store.vendors.len() as u64 + 1,
            name: vendor.name.clone(),
            bank_name: vendor.bank_name.clone(),
            branch_name: vendor.branch_name.clone(),
            account_type: vendor.account_type,
            account_number: vendor.account_number.clone(),
            account_holder: vendor.account_holder.clone(),
            source: VendorSource::Manual,
            upload_source: None,
            bank_code: None,
            branch_code: None,
        };
        store.vendors.push(created.clone());
        Ok(created)
    }

    async fn search_vendors(&self, query: &str) -> ClientResult<Vec<Vendor>> {
        let store = self.enter("search_vendors")?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(store
            .vendors
            .iter()
            .filter(|v| v.matches(query))
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    async fn list_companies(&self) -> ClientResult<Vec<RemittanceCompany>> {
        Ok(self.enter("list_companies")?.companies.clone())
    }

    async fn list_payments(&self) -> ClientResult<Vec<PaymentRecord>> {
        Ok(self.enter("list_payments")?.payments.clone())
    }

    async fn get_payment(&self, payment_id: &str) -> ClientResult<PaymentRecord> {
        let store = self.enter("get_payment")?;
        store
            .payments
            .iter()
            .find(|p| p.id == payment_id)
            .cloned()
            .ok_or_else(|| not_found("支払データが見つかりません"))
    }

    async fn create_payment(&self, payment: &NewPayment) -> ClientResult<PaymentReceipt> {
        let mut store = self.enter("create_payment")?;
        let id = Self::next_payment_id(&store);
        store.payments.push(PaymentRecord {
            id: id.clone(),
            payment_date: payment.payment_date.clone(),
            remittance_company: payment.remittance_company.clone(),
            items: payment.items.clone(),
            created_at: now_iso(),
        });

        if self.render_pdf.load(Ordering::SeqCst) {
            Ok(PaymentReceipt {
                pdf_filename: Some(Artifact::Pdf.default_filename(&id)),
                payment_id: id,
                pdf_generated: true,
                pdf_error: None,
            })
        } else {
            Ok(PaymentReceipt {
                payment_id: id,
                pdf_generated: false,
                pdf_filename: None,
                pdf_error: Some("PDF生成エラー: renderer unavailable".to_string()),
            })
        }
    }

    async fn delete_payment(&self, payment_id: &str) -> ClientResult<ActionReceipt> {
        let mut store = self.enter("delete_payment")?;
        let before = store.payments.len();
        store.payments.retain(|p| p.id != payment_id);
        if store.payments.len() == before {
            return Err(not_found("支払データが見つかりません"));
        }
        Ok(ActionReceipt { message: "支払データを削除しました".to_string() })
    }

    async fn download(&self, artifact: Artifact, payment_id: &str) -> ClientResult<Download> {
        let store = self.enter("download")?;
        let payment = store
            .payments
            .iter()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| not_found("支払データが見つかりません"))?;

        let body = format!("{} {} {}", artifact, payment.id, payment.total());
        Ok(Download {
            filename: artifact.default_filename(payment_id),
            content_type: artifact.default_content_type().to_string(),
            body: bytes::Bytes::from(body),
        })
    }

    async fn upload_file(&self, filename: &str, content: Vec<u8>) -> ClientResult<UploadReceipt> {
        let mut store = self.enter("upload_file")?;
        let allowed = filename
            .rsplit_once('.')
            .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !allowed {
            return Err(ClientError::Status {
                status: 400,
                message: "許可されていないファイル形式です".to_string(),
            });
        }

        store.files.retain(|f| f.filename != filename);
        store.files.push(UploadedFile {
            filename: filename.to_string(),
            size: content.len() as u64,
            modified: now_iso(),
        });

        Ok(UploadReceipt {
            filename: filename.to_string(),
            vendor_count: 0,
            message: "0件の業者データを読み込みました".to_string(),
        })
    }

    async fn list_uploaded_files(&self) -> ClientResult<Vec<UploadedFile>> {
        Ok(self.enter("list_uploaded_files")?.files.clone())
    }

    async fn delete_uploaded_file(&self, filename: &str) -> ClientResult<ActionReceipt> {
        let mut store = self.enter("delete_uploaded_file")?;
        let before = store.files.len();
        store.files.retain(|f| f.filename != filename);
        if store.files.len() == before {
            return Err(not_found("ファイルが見つかりません"));
        }

        store.vendors.retain(|v| !v.is_uploaded());
        for (i, vendor) in store.vendors.iter_mut().enumerate() {
            vendor.id = i as u64 + 1;
        }

        Ok(ActionReceipt { message: "ファイルと関連する業者データを削除しました".to_string() })
    }

    async fn create_backup(&self) -> ClientResult<BackupReceipt> {
        let mut store = self.enter("create_backup")?;
        let snapshot = Snapshot {
            filename: format!(
                "payments_{}_{}.backup",
                Local::now().format("%Y%m%d_%H%M%S"),
                store.backups.len() + 1
            ),
            modified: now_iso(),
            vendors: store.vendors.clone(),
            payments: store.payments.clone(),
        };
        let receipt = BackupReceipt {
            payments_count: snapshot.payments.len(),
            vendors_count: snapshot.vendors.len(),
        };
        store.backups.push(snapshot);
        Ok(receipt)
    }

    async fn restore_backup(&self) -> ClientResult<RestoreReceipt> {
        let mut store = self.enter("restore_backup")?;
        let snapshot = store
            .backups
            .last()
            .cloned()
            .ok_or_else(|| ClientError::Rejected { message: "バックアップファイルがありません".to_string() })?;

        store.vendors = snapshot.vendors;
        store.payments = snapshot.payments;
        Ok(RestoreReceipt {
            payments_restored: store.payments.len(),
            vendors_restored: store.vendors.len(),
        })
    }

    async fn backup_status(&self) -> ClientResult<BackupStatus> {
        let store = self.enter("backup_status")?;
        Ok(BackupStatus {
            backup_count: store.backups.len(),
            backup_files: store
                .backups
                .iter()
                .map(|b| BackupFile { filename: b.filename.clone(), modified: b.modified.clone() })
                .collect(),
        })
    }
}
