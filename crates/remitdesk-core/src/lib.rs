//! Session state and command dispatch for the payment console
//!
//! A [`Controller`] owns the backend handle and one [`Session`] behind an
//! async read/write lock. Every operator action arrives as a [`Command`];
//! network calls run without holding the lock and the write lock is taken
//! only to apply their results.

pub mod command;
pub mod debounce;
pub mod directory;
pub mod draft;
pub mod error;
pub mod notice;

use chrono::Local;
use remitdesk_client::{
    Artifact, BackendRef, ClientError, Download, NewVendor, PaymentRecord, RemittanceCompany,
    UploadedFile, Vendor,
};
use remitdesk_config::Config;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard};

pub use command::{Command, Effect, Outcome, SearchField, Section};
pub use debounce::Debouncer;
pub use directory::{CompanyLookup, VendorDirectory, VendorStats};
pub use draft::{DraftHeader, ItemForm, ItemId, PaymentDraft, PaymentLineItem};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorLogger, ErrorSeverity};
pub use notice::{Notice, NoticeAction, NoticeBoard, Severity};

/// Backup files listed in the status notice
const BACKUP_STATUS_FILES: usize = 3;

fn backend_error(operation: &'static str) -> impl FnOnce(ClientError) -> CoreError {
    move |source| CoreError::backend(operation, source)
}

fn confirm(confirmed: bool, prompt: impl Into<String>) -> CoreResult<()> {
    if confirmed {
        Ok(())
    } else {
        Err(CoreError::ConfirmationRequired { prompt: prompt.into() })
    }
}

// ==================== Session ====================

/// Vendor picked in the entry form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryForm {
    pub vendor_id: Option<u64>,
    /// Text in the vendor search field
    pub vendor_query: String,
}

/// Results shown under a search field
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionPanel<T> {
    pub query: String,
    pub results: Vec<T>,
    pub open: bool,
}

impl<T> Default for SuggestionPanel<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            open: false,
        }
    }
}

impl<T> SuggestionPanel<T> {
    pub fn show(&mut self, query: String, results: Vec<T>) {
        self.query = query;
        self.results = results;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.results.clear();
        self.open = false;
    }
}

/// Last payment submitted in this session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPayment {
    pub payment_id: String,
    pub pdf_generated: bool,
}

/// JSON view of the draft
#[derive(Debug, Clone, Serialize)]
pub struct DraftSnapshot {
    pub payment_date: String,
    pub remittance_company: String,
    pub items: Vec<PaymentLineItem>,
    pub total: i64,
    pub total_display: String,
    pub can_submit: bool,
    pub current_payment: Option<CurrentPayment>,
}

/// Everything the console shows
#[derive(Debug)]
pub struct Session {
    pub directory: VendorDirectory,
    pub companies: CompanyLookup,
    pub draft: PaymentDraft,
    pub header: DraftHeader,
    pub entry: EntryForm,
    pub vendor_suggestions: SuggestionPanel<Vendor>,
    pub company_suggestions: SuggestionPanel<RemittanceCompany>,
    pub current_payment: Option<CurrentPayment>,
    pub history: Vec<PaymentRecord>,
    pub uploaded_files: Vec<UploadedFile>,
    pub notices: NoticeBoard,
}

impl Session {
    pub fn new(notice_ttl: Duration) -> Self {
        Self {
            directory: VendorDirectory::default(),
            companies: CompanyLookup::default(),
            draft: PaymentDraft::new(),
            header: DraftHeader::default(),
            entry: EntryForm::default(),
            vendor_suggestions: SuggestionPanel::default(),
            company_suggestions: SuggestionPanel::default(),
            current_payment: None,
            history: Vec::new(),
            uploaded_files: Vec::new(),
            notices: NoticeBoard::new(notice_ttl),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.draft.can_submit(&self.header)
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            payment_date: self.header.payment_date.clone(),
            remittance_company: self.header.remittance_company.clone(),
            items: self.draft.items().to_vec(),
            total: self.draft.total(),
            total_display: self.draft.total_display(),
            can_submit: self.can_submit(),
            current_payment: self.current_payment.clone(),
        }
    }

    /// Drop everything a page reload would lose
    fn reset_draft(&mut self) {
        self.draft.clear();
        self.header = DraftHeader::default();
        self.entry = EntryForm::default();
        self.vendor_suggestions.close();
        self.company_suggestions.close();
        self.current_payment = None;
    }
}

// ==================== Controller ====================

/// Tunables taken from the configuration
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub debounce: Duration,
    pub max_suggestions: usize,
    pub notice_ttl: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.debounce_window(),
            max_suggestions: config.search.max_suggestions,
            notice_ttl: Duration::from_millis(config.notices.dismiss_ms),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct Controller {
    backend: BackendRef,
    session: Arc<RwLock<Session>>,
    debouncer: Debouncer,
    settings: ControllerSettings,
    logger: Box<dyn ErrorLogger>,
}

impl Controller {
    pub fn new(backend: BackendRef, config: &Config) -> Self {
        Self::with_settings(backend, ControllerSettings::from_config(config))
    }

    pub fn with_settings(backend: BackendRef, settings: ControllerSettings) -> Self {
        Self {
            backend,
            session: Arc::new(RwLock::new(Session::new(settings.notice_ttl))),
            debouncer: Debouncer::new(settings.debounce),
            settings,
            logger: Box::new(DefaultErrorLogger),
        }
    }

    /// Read access for rendering
    pub async fn session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().await
    }

    /// Fetch a backend artifact for the download proxy
    pub async fn download(&self, artifact: Artifact, payment_id: &str) -> CoreResult<Download> {
        self.backend
            .download(artifact, payment_id)
            .await
            .map_err(backend_error("download"))
    }

    /// Run one command; failures come back as a notice, never as an error
    pub async fn dispatch(&self, command: Command) -> Outcome {
        let name = command.name();
        log::debug!("dispatch {}", name);

        let outcome = match self.execute(command).await {
            Ok(outcome) => outcome,
            Err(CoreError::ConfirmationRequired { prompt }) => {
                log::debug!("{} awaiting confirmation", name);
                return Outcome::effect(Effect::ConfirmationRequired { prompt });
            }
            Err(error) => {
                self.logger.log_error(&error, name);
                Outcome::notice(Notice::new(error.notice_severity(), error.user_message()))
            }
        };

        if let Some(notice) = &outcome.notice {
            self.session.write().await.notices.post(notice.clone());
        }
        outcome
    }

    async fn execute(&self, command: Command) -> CoreResult<Outcome> {
        match command {
            Command::Initialize => self.initialize().await,
            Command::ReloadVendors => {
                self.reload_vendors().await?;
                Ok(Outcome::none())
            }
            Command::RegisterVendor(vendor) => self.register_vendor(vendor).await,
            Command::SearchVendors(query) => self.search_vendors(query).await,
            Command::SelectVendor(id) => self.select_vendor(id).await,
            Command::SearchCompanies(query) => self.search_companies(query).await,
            Command::SelectCompany(name) => self.select_company(name).await,
            Command::DismissSuggestions(field) => self.dismiss_suggestions(field).await,
            Command::SetPaymentDate(date) => {
                self.session.write().await.header.set_payment_date(&date)?;
                Ok(Outcome::none())
            }
            Command::AddItem(form) => self.add_item(form).await,
            Command::RemoveItem(id) => self.remove_item(id).await,
            Command::LoadFromHistory(payment_id) => self.load_from_history(payment_id).await,
            Command::Submit => self.submit().await,
            Command::DownloadPdf(payment_id) => Ok(Outcome::effect(Effect::Download {
                artifact: Artifact::Pdf,
                payment_id,
            })),
            Command::DownloadTransfer(payment_id) => self.download_transfer(payment_id).await,
            Command::LoadHistory => {
                self.reload_history().await?;
                Ok(Outcome::none())
            }
            Command::DeletePayment { payment_id, confirmed } => {
                self.delete_payment(payment_id, confirmed).await
            }
            Command::UploadFile { filename, content } => self.upload_file(filename, content).await,
            Command::LoadUploadedFiles => {
                self.reload_uploaded_files().await?;
                Ok(Outcome::none())
            }
            Command::DeleteUploadedFile { filename, confirmed } => {
                self.delete_uploaded_file(filename, confirmed).await
            }
            Command::CreateBackup { confirmed } => self.create_backup(confirmed).await,
            Command::RestoreBackup { confirmed } => self.restore_backup(confirmed).await,
            Command::CheckBackupStatus => self.check_backup_status().await,
        }
    }

    fn log_failure(&self, result: CoreResult<()>, operation: &str) {
        if let Err(error) = result {
            self.logger.log_error(&error, operation);
        }
    }

    // ---------- caches ----------

    async fn initialize(&self) -> CoreResult<Outcome> {
        {
            let mut session = self.session.write().await;
            if session.header.payment_date.is_empty() {
                session.header.payment_date = Local::now().format("%Y-%m-%d").to_string();
            }
        }
        self.refresh_all().await?;
        Ok(Outcome::none())
    }

    async fn refresh_all(&self) -> CoreResult<()> {
        let (vendors, companies, history, files) = tokio::join!(
            self.reload_vendors(),
            self.load_companies(),
            self.reload_history(),
            self.reload_uploaded_files(),
        );
        self.log_failure(files, "load_uploaded_files");
        vendors.and(companies).and(history)
    }

    async fn reload_vendors(&self) -> CoreResult<()> {
        let vendors = self.backend.list_vendors().await.map_err(backend_error("list_vendors"))?;
        log::info!("loaded {} vendors", vendors.len());
        self.session.write().await.directory.replace(vendors);
        Ok(())
    }

    async fn load_companies(&self) -> CoreResult<()> {
        let companies = self.backend.list_companies().await.map_err(backend_error("list_companies"))?;
        log::info!("loaded {} remittance companies", companies.len());
        self.session.write().await.companies.replace(companies);
        Ok(())
    }

    async fn reload_history(&self) -> CoreResult<()> {
        let history = self.backend.list_payments().await.map_err(backend_error("list_payments"))?;
        self.session.write().await.history = history;
        Ok(())
    }

    async fn reload_uploaded_files(&self) -> CoreResult<()> {
        let files = self
            .backend
            .list_uploaded_files()
            .await
            .map_err(backend_error("list_uploaded_files"))?;
        self.session.write().await.uploaded_files = files;
        Ok(())
    }

    // ---------- vendors ----------

    async fn register_vendor(&self, vendor: NewVendor) -> CoreResult<Outcome> {
        let required = [
            &vendor.name,
            &vendor.bank_name,
            &vendor.branch_name,
            &vendor.account_number,
            &vendor.account_holder,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(CoreError::validation("すべての項目を入力してください"));
        }

        let vendor = NewVendor {
            name: vendor.name.trim().to_string(),
            bank_name: vendor.bank_name.trim().to_string(),
            branch_name: vendor.branch_name.trim().to_string(),
            account_type: vendor.account_type,
            account_number: vendor.account_number.trim().to_string(),
            account_holder: vendor.account_holder.trim().to_string(),
        };
        let created = self.backend.create_vendor(&vendor).await.map_err(backend_error("create_vendor"))?;
        log::info!("registered vendor {} ({})", created.id, created.name);

        self.log_failure(self.reload_vendors().await, "reload_vendors");
        Ok(Outcome::notice(Notice::success("業者を登録しました")))
    }

    async fn search_vendors(&self, query: String) -> CoreResult<Outcome> {
        let field = SearchField::Vendor;
        let query = query.trim().to_string();
        if query.is_empty() {
            self.debouncer.cancel(field.key());
            let mut session = self.session.write().await;
            session.entry.vendor_query.clear();
            session.vendor_suggestions.close();
            return Ok(Outcome::effect(Effect::Suggestions { field }));
        }

        let backend = Arc::clone(&self.backend);
        let session = Arc::clone(&self.session);
        let limit = self.settings.max_suggestions;
        let task = async move {
            let mut results = backend
                .search_vendors(&query)
                .await
                .map_err(backend_error("search_vendors"))?;
            results.truncate(limit);

            let mut session = session.write().await;
            session.entry.vendor_query = query.clone();
            session.vendor_suggestions.show(query, results);
            Ok::<_, CoreError>(())
        };

        match self.debouncer.schedule(field.key(), task).await {
            None => Ok(Outcome::effect(Effect::Superseded)),
            Some(result) => {
                if let Err(error) = result {
                    self.logger.log_error(&error, "search_vendors");
                    self.session.write().await.vendor_suggestions.close();
                }
                Ok(Outcome::effect(Effect::Suggestions { field }))
            }
        }
    }

    async fn select_vendor(&self, id: u64) -> CoreResult<Outcome> {
        self.debouncer.cancel(SearchField::Vendor.key());
        let mut session = self.session.write().await;
        let name = session
            .directory
            .get(id)
            .map(|v| v.name.clone())
            .ok_or(CoreError::VendorNotFound { id })?;

        session.entry.vendor_id = Some(id);
        session.entry.vendor_query = name;
        session.vendor_suggestions.close();
        Ok(Outcome::effect(Effect::Suggestions { field: SearchField::Vendor }))
    }

    // ---------- companies ----------

    async fn search_companies(&self, query: String) -> CoreResult<Outcome> {
        let field = SearchField::Company;
        let query = query.trim().to_string();
        if query.is_empty() {
            self.debouncer.cancel(field.key());
            let mut session = self.session.write().await;
            session.header.clear_company();
            session.company_suggestions.close();
            return Ok(Outcome::effect(Effect::Suggestions { field }));
        }

        let lookup = self.session.read().await.companies.clone();
        let session = Arc::clone(&self.session);
        let task = async move {
            let results = lookup.search(&query);
            let mut session = session.write().await;
            session.header.company_query = query.clone();
            session.company_suggestions.show(query, results);
        };

        match self.debouncer.schedule(field.key(), task).await {
            None => Ok(Outcome::effect(Effect::Superseded)),
            Some(()) => Ok(Outcome::effect(Effect::Suggestions { field })),
        }
    }

    async fn select_company(&self, name: String) -> CoreResult<Outcome> {
        self.debouncer.cancel(SearchField::Company.key());
        let mut session = self.session.write().await;
        let name = name.trim();
        if name.is_empty() {
            session.header.clear_company();
        } else {
            session.header.select_company(name);
        }
        session.company_suggestions.close();
        Ok(Outcome::effect(Effect::Suggestions { field: SearchField::Company }))
    }

    async fn dismiss_suggestions(&self, field: SearchField) -> CoreResult<Outcome> {
        self.debouncer.cancel(field.key());
        let mut session = self.session.write().await;
        match field {
            SearchField::Vendor => session.vendor_suggestions.close(),
            SearchField::Company => session.company_suggestions.close(),
        }
        Ok(Outcome::effect(Effect::Suggestions { field }))
    }

    // ---------- draft ----------

    async fn add_item(&self, form: ItemForm) -> CoreResult<Outcome> {
        let mut guard = self.session.write().await;
        let session = &mut *guard;
        let item = session.draft.add_item(&form, &session.directory)?;
        log::info!("added item {} for vendor {} ({})", item.id, item.vendor_id, item.amount);

        session.entry = EntryForm::default();
        session.vendor_suggestions.close();
        Ok(Outcome::notice(Notice::success("支払項目を追加しました")))
    }

    async fn remove_item(&self, id: ItemId) -> CoreResult<Outcome> {
        match self.session.write().await.draft.remove_item(id) {
            Some(item) => {
                log::info!("removed item {} ({})", item.id, item.amount);
                Ok(Outcome::notice(Notice::success("支払項目を削除しました")))
            }
            None => Ok(Outcome::none()),
        }
    }

    async fn load_from_history(&self, payment_id: String) -> CoreResult<Outcome> {
        let record = self.backend.get_payment(&payment_id).await.map_err(backend_error("get_payment"))?;

        {
            let mut session = self.session.write().await;
            session.draft.replace_from_record(&record);
            session.header.payment_date = record.payment_date.clone();
            session.header.select_company(&record.remittance_company);
            session.entry = EntryForm::default();
            session.vendor_suggestions.close();
            session.company_suggestions.close();
        }
        log::info!("loaded payment {} into the draft ({} items)", record.id, record.items.len());

        let message = format!(
            "「{}」の支払表（{}）を再作成用に読み込みました。内容を確認・編集して保存してください。",
            record.remittance_company,
            record.payment_date_display()
        );
        Ok(Outcome::notice(Notice::info(message)).with_effect(Effect::Show { section: Section::Payment }))
    }

    async fn submit(&self) -> CoreResult<Outcome> {
        let payment = {
            let session = self.session.read().await;
            session.draft.submission(&session.header)?
        };

        let receipt = self.backend.create_payment(&payment).await.map_err(backend_error("create_payment"))?;
        log::info!(
            "payment {} created with {} items (pdf: {})",
            receipt.payment_id,
            payment.items.len(),
            receipt.pdf_generated
        );

        self.session.write().await.current_payment = Some(CurrentPayment {
            payment_id: receipt.payment_id.clone(),
            pdf_generated: receipt.pdf_generated,
        });

        let mut message = String::from("支払表を作成しました");
        if receipt.pdf_generated {
            message.push_str("。PDFも生成されました。");
        } else if let Some(error) = &receipt.pdf_error {
            message.push_str(&format!("。ただし、PDF生成に失敗しました: {}", error));
        }
        let mut notice = Notice::success(message);
        if receipt.pdf_generated {
            notice = notice.with_action(NoticeAction::DownloadPdf(receipt.payment_id.clone()));
        }

        self.log_failure(self.reload_history().await, "reload_history");
        Ok(Outcome::notice(notice))
    }

    async fn download_transfer(&self, payment_id: Option<String>) -> CoreResult<Outcome> {
        if let Some(payment_id) = payment_id {
            return Ok(Outcome::effect(Effect::Download { artifact: Artifact::Transfer, payment_id }));
        }

        let payment_id = self
            .session
            .read()
            .await
            .current_payment
            .as_ref()
            .map(|current| current.payment_id.clone())
            .ok_or(CoreError::NoCurrentPayment)?;

        Ok(Outcome::notice(Notice::success("総合振込ファイルをダウンロードしました"))
            .with_effect(Effect::Download { artifact: Artifact::Transfer, payment_id }))
    }

    // ---------- history ----------

    async fn delete_payment(&self, payment_id: String, confirmed: bool) -> CoreResult<Outcome> {
        if !confirmed {
            let session = self.session.read().await;
            let prompt = match session.history.iter().find(|record| record.id == payment_id) {
                Some(record) => format!(
                    "「{}」の支払表（{}）を削除しますか？",
                    record.remittance_company,
                    record.payment_date_display()
                ),
                None => "この支払表を削除しますか？".to_string(),
            };
            confirm(false, prompt)?;
        }

        self.backend.delete_payment(&payment_id).await.map_err(backend_error("delete_payment"))?;
        log::info!("deleted payment {}", payment_id);

        {
            let mut session = self.session.write().await;
            if session.current_payment.as_ref().map(|c| c.payment_id.as_str()) == Some(payment_id.as_str()) {
                session.current_payment = None;
            }
        }
        self.log_failure(self.reload_history().await, "reload_history");
        Ok(Outcome::notice(Notice::success("支払表を削除しました")))
    }

    // ---------- uploads ----------

    async fn upload_file(&self, filename: String, content: Vec<u8>) -> CoreResult<Outcome> {
        let filename = filename.trim().to_string();
        if filename.is_empty() {
            return Err(CoreError::validation("ファイルを選択してください"));
        }

        let receipt = self
            .backend
            .upload_file(&filename, content)
            .await
            .map_err(backend_error("upload_file"))?;
        log::info!("uploaded {} ({} vendors)", receipt.filename, receipt.vendor_count);

        let (vendors, files) = tokio::join!(self.reload_vendors(), self.reload_uploaded_files());
        self.log_failure(vendors, "reload_vendors");
        self.log_failure(files, "load_uploaded_files");

        let message = if receipt.message.is_empty() {
            format!("{}件の業者データを読み込みました", receipt.vendor_count)
        } else {
            receipt.message
        };
        Ok(Outcome::notice(Notice::success(message)))
    }

    async fn delete_uploaded_file(&self, filename: String, confirmed: bool) -> CoreResult<Outcome> {
        confirm(
            confirmed,
            format!("ファイル「{}」を削除しますか？\n関連する業者データも削除されます。", filename),
        )?;

        let receipt = self
            .backend
            .delete_uploaded_file(&filename)
            .await
            .map_err(backend_error("delete_uploaded_file"))?;
        log::info!("deleted uploaded file {}", filename);

        let (vendors, files) = tokio::join!(self.reload_vendors(), self.reload_uploaded_files());
        self.log_failure(vendors, "reload_vendors");
        self.log_failure(files, "load_uploaded_files");

        let message = if receipt.message.is_empty() {
            "ファイルを削除しました".to_string()
        } else {
            receipt.message
        };
        Ok(Outcome::notice(Notice::success(message)))
    }

    // ---------- backup ----------

    async fn create_backup(&self, confirmed: bool) -> CoreResult<Outcome> {
        confirm(confirmed, "現在のデータのバックアップを作成しますか？")?;

        let receipt = self.backend.create_backup().await.map_err(backend_error("create_backup"))?;
        log::info!("backup created ({} payments, {} vendors)", receipt.payments_count, receipt.vendors_count);

        Ok(Outcome::notice(Notice::success(format!(
            "バックアップを作成しました\n支払データ: {}件\n業者データ: {}件",
            receipt.payments_count, receipt.vendors_count
        ))))
    }

    async fn restore_backup(&self, confirmed: bool) -> CoreResult<Outcome> {
        confirm(confirmed, "バックアップからデータを復元しますか？\n現在のデータは上書きされます。")?;

        let receipt = self.backend.restore_backup().await.map_err(backend_error("restore_backup"))?;
        log::warn!(
            "data restored from backup ({} payments, {} vendors)",
            receipt.payments_restored,
            receipt.vendors_restored
        );

        self.session.write().await.reset_draft();
        let refreshed = self.initialize().await.map(|_| ());
        self.log_failure(refreshed, "initialize");

        Ok(Outcome::notice(Notice::success(format!(
            "データを復元しました\n支払データ: {}件\n業者データ: {}件",
            receipt.payments_restored, receipt.vendors_restored
        )))
        .with_effect(Effect::ReloadPage))
    }

    async fn check_backup_status(&self) -> CoreResult<Outcome> {
        let status = self.backend.backup_status().await.map_err(backend_error("backup_status"))?;

        let mut message = format!("バックアップ状態\n\nバックアップファイル数: {}件", status.backup_count);
        let latest = status.latest(BACKUP_STATUS_FILES);
        if latest.is_empty() {
            message.push_str("\n\nバックアップファイルがありません。");
        } else {
            message.push_str("\n\n最新のバックアップファイル:");
            for file in latest {
                message.push_str(&format!("\n• {} ({})", file.filename, file.modified_display()));
            }
        }
        Ok(Outcome::notice(Notice::info(message)))
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("debouncer", &self.debouncer)
            .field("settings", &self.settings)
            .finish()
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use remitdesk_client::{AccountType, MemoryBackend, PaymentItem, VendorSource};

    fn vendor(id: u64, name: &str) -> Vendor {
        Vendor {
            id,
            name: name.to_string(),
            bank_name: "三菱UFJ銀行".to_string(),
            branch_name: "渋谷支店".to_string(),
            account_type: AccountType::Ordinary,
            account_number: format!("{:07}", id),
            account_holder: name.to_string(),
            source: VendorSource::Manual,
            upload_source: None,
            bank_code: None,
            branch_code: None,
        }
    }

    fn company(name: &str) -> RemittanceCompany {
        RemittanceCompany {
            name: name.to_string(),
            bank_name: "みずほ銀行".to_string(),
            branch_name: "本店".to_string(),
            account_number: "7654321".to_string(),
            account_holder: None,
        }
    }

    fn record(id: &str) -> PaymentRecord {
        PaymentRecord {
            id: id.to_string(),
            payment_date: "2024-05-31".to_string(),
            remittance_company: "ABC Trading".to_string(),
            items: vec![
                PaymentItem { vendor_id: 1, vendor_name: "山田商店".into(), amount: 4000, description: "資材".into(), remarks: "".into() },
                PaymentItem { vendor_id: 2, vendor_name: "佐藤工業".into(), amount: 6000, description: "運送".into(), remarks: "5月分".into() },
            ],
            created_at: "2024-05-20T09:00:00".to_string(),
        }
    }

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(
            MemoryBackend::new()
                .with_vendors(vec![vendor(1, "山田商店"), vendor(2, "佐藤工業")])
                .with_companies(vec![company("ABC Trading"), company("Tabby Co"), company("xyz")])
                .with_payments(vec![record("20240520_090000")]),
        )
    }

    async fn ready(backend: &Arc<MemoryBackend>) -> Controller {
        let controller = Controller::new(backend.clone(), &Config::default());
        controller.dispatch(Command::Initialize).await;
        controller
    }

    async fn fill_header(controller: &Controller) {
        controller.dispatch(Command::SetPaymentDate("2024-06-30".into())).await;
        controller.dispatch(Command::SelectCompany("ABC Trading".into())).await;
    }

    #[tokio::test]
    async fn test_initialize_loads_caches() {
        let backend = backend();
        let controller = ready(&backend).await;
        let session = controller.session().await;

        assert_eq!(session.directory.len(), 2);
        assert_eq!(session.companies.companies().len(), 3);
        assert_eq!(session.history.len(), 1);
        assert!(!session.header.payment_date.is_empty());
        assert!(session.notices.active().is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_vendors() {
        let backend = backend();
        let controller = ready(&backend).await;

        backend.set_offline(true);
        let outcome = controller.dispatch(Command::ReloadVendors).await;

        let notice = outcome.notice.unwrap();
        assert_eq!(notice.severity, Severity::Danger);
        assert!(notice.message.starts_with("業者データの読み込みに失敗しました"));
        assert_eq!(controller.session().await.directory.len(), 2);
    }

    #[tokio::test]
    async fn test_add_and_remove_items_update_total() {
        let backend = backend();
        let controller = ready(&backend).await;

        controller.dispatch(Command::AddItem(ItemForm::new(1, 1000, "資材", ""))).await;
        controller.dispatch(Command::AddItem(ItemForm::new(2, 2500, "運送", ""))).await;
        let first = {
            let session = controller.session().await;
            assert_eq!(session.draft.total_display(), "3,500");
            session.draft.items()[0].id
        };

        let outcome = controller.dispatch(Command::RemoveItem(first)).await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Success);
        assert_eq!(controller.session().await.draft.total_display(), "2,500");
    }

    #[tokio::test]
    async fn test_invalid_item_leaves_draft_unchanged() {
        let backend = backend();
        let controller = ready(&backend).await;
        controller.dispatch(Command::SelectVendor(1)).await;

        let outcome = controller.dispatch(Command::AddItem(ItemForm::new(1, 100, " ", ""))).await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Danger);

        let outcome = controller.dispatch(Command::AddItem(ItemForm::new(9, 100, "x", ""))).await;
        assert_eq!(outcome.notice.unwrap().message, "選択された業者が見つかりません");

        let session = controller.session().await;
        assert!(session.draft.is_empty());
        assert_eq!(session.entry.vendor_id, Some(1));
    }

    #[tokio::test]
    async fn test_submit_requires_header_and_items() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller.dispatch(Command::Submit).await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Warning);

        controller.dispatch(Command::AddItem(ItemForm::new(1, 1000, "資材", ""))).await;
        controller.dispatch(Command::SelectCompany(String::new())).await;
        let outcome = controller.dispatch(Command::Submit).await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Warning);

        assert!(!backend.calls().contains(&"create_payment".to_string()));
    }

    #[tokio::test]
    async fn test_submit_stores_current_payment() {
        let backend = backend();
        let controller = ready(&backend).await;
        fill_header(&controller).await;
        controller.dispatch(Command::AddItem(ItemForm::new(1, 1000, "資材", ""))).await;

        let outcome = controller.dispatch(Command::Submit).await;
        let notice = outcome.notice.unwrap();
        assert_eq!(notice.severity, Severity::Success);
        assert!(notice.message.contains("PDFも生成されました"));

        let session = controller.session().await;
        let current = session.current_payment.clone().unwrap();
        assert_eq!(notice.action, Some(NoticeAction::DownloadPdf(current.payment_id.clone())));
        assert_eq!(session.history.len(), 2);
        assert!(session.history.iter().any(|r| r.id == current.payment_id));
    }

    #[tokio::test]
    async fn test_submit_reports_pdf_failure() {
        let backend = backend();
        backend.set_pdf_rendering(false);
        let controller = ready(&backend).await;
        fill_header(&controller).await;
        controller.dispatch(Command::AddItem(ItemForm::new(2, 500, "運送", ""))).await;

        let notice = controller.dispatch(Command::Submit).await.notice.unwrap();
        assert!(notice.message.contains("PDF生成に失敗しました"));
        assert!(notice.action.is_none());
        assert!(controller.session().await.current_payment.is_some());
    }

    #[tokio::test]
    async fn test_transfer_download_needs_current_payment() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller.dispatch(Command::DownloadTransfer(None)).await;
        assert_eq!(outcome.notice.unwrap().message, "先に支払表を作成してください");
        assert_eq!(outcome.effect, Effect::None);

        let outcome = controller.dispatch(Command::DownloadTransfer(Some("p1".into()))).await;
        assert_eq!(
            outcome.effect,
            Effect::Download { artifact: Artifact::Transfer, payment_id: "p1".into() }
        );
    }

    #[tokio::test]
    async fn test_load_from_history_replaces_draft() {
        let backend = backend();
        let controller = ready(&backend).await;
        controller.dispatch(Command::AddItem(ItemForm::new(1, 1, "old", ""))).await;

        let outcome = controller.dispatch(Command::LoadFromHistory("20240520_090000".into())).await;
        assert_eq!(outcome.effect, Effect::Show { section: Section::Payment });
        assert_eq!(outcome.notice.unwrap().severity, Severity::Info);

        let session = controller.session().await;
        assert_eq!(session.draft.len(), 2);
        assert_eq!(session.draft.total(), 10000);
        assert!(session.draft.items().iter().all(|item| item.description != "old"));
        assert_eq!(session.header.payment_date, "2024-05-31");
        assert_eq!(session.header.company_query, "ABC Trading");
        assert_eq!(session.header.remittance_company, "ABC Trading");
        assert_eq!(backend.payments()[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_record_keeps_draft() {
        let backend = backend();
        let controller = ready(&backend).await;
        controller.dispatch(Command::AddItem(ItemForm::new(1, 700, "keep", ""))).await;

        let outcome = controller.dispatch(Command::LoadFromHistory("nope".into())).await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Danger);
        assert_eq!(controller.session().await.draft.total(), 700);
    }

    #[tokio::test]
    async fn test_unconfirmed_destructive_commands_never_reach_backend() {
        let backend = backend();
        let controller = ready(&backend).await;
        let before = backend.calls().len();

        let commands = vec![
            Command::DeletePayment { payment_id: "20240520_090000".into(), confirmed: false },
            Command::DeleteUploadedFile { filename: "vendors.csv".into(), confirmed: false },
            Command::CreateBackup { confirmed: false },
            Command::RestoreBackup { confirmed: false },
        ];
        for command in commands {
            let outcome = controller.dispatch(command).await;
            assert!(matches!(outcome.effect, Effect::ConfirmationRequired { .. }));
            assert!(outcome.notice.is_none());
        }

        assert_eq!(backend.calls().len(), before);
        assert_eq!(backend.payments().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_payment_prompt_and_reload() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller
            .dispatch(Command::DeletePayment { payment_id: "20240520_090000".into(), confirmed: false })
            .await;
        match outcome.effect {
            Effect::ConfirmationRequired { prompt } => assert!(prompt.contains("ABC Trading")),
            other => panic!("unexpected effect {:?}", other),
        }

        let outcome = controller
            .dispatch(Command::DeletePayment { payment_id: "20240520_090000".into(), confirmed: true })
            .await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Success);
        assert!(controller.session().await.history.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_history() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller
            .dispatch(Command::DeletePayment { payment_id: "missing".into(), confirmed: true })
            .await;
        let notice = outcome.notice.unwrap();
        assert_eq!(notice.severity, Severity::Danger);
        assert!(notice.message.contains("支払データが見つかりません"));
        assert_eq!(controller.session().await.history.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_requires_file_and_reloads_lists() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller
            .dispatch(Command::UploadFile { filename: " ".into(), content: vec![] })
            .await;
        assert_eq!(outcome.notice.unwrap().message, "ファイルを選択してください");
        assert!(!backend.calls().contains(&"upload_file".to_string()));

        let outcome = controller
            .dispatch(Command::UploadFile { filename: "master.csv".into(), content: b"a,b".to_vec() })
            .await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Success);
        assert_eq!(controller.session().await.uploaded_files.len(), 1);

        let outcome = controller
            .dispatch(Command::DeleteUploadedFile { filename: "master.csv".into(), confirmed: true })
            .await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Success);
        assert!(controller.session().await.uploaded_files.is_empty());
    }

    #[tokio::test]
    async fn test_backup_restore_reloads_page() {
        let backend = backend();
        let controller = ready(&backend).await;

        let notice = controller.dispatch(Command::CreateBackup { confirmed: true }).await.notice.unwrap();
        assert!(notice.message.contains("支払データ: 1件"));

        controller.dispatch(Command::AddItem(ItemForm::new(1, 100, "x", ""))).await;
        let outcome = controller.dispatch(Command::RestoreBackup { confirmed: true }).await;
        assert_eq!(outcome.effect, Effect::ReloadPage);
        assert!(controller.session().await.draft.is_empty());

        let notice = controller.dispatch(Command::CheckBackupStatus).await.notice.unwrap();
        assert_eq!(notice.severity, Severity::Info);
        assert!(notice.message.contains("バックアップファイル数: 1件"));
    }

    #[tokio::test]
    async fn test_backup_status_lists_latest_three_oldest_first() {
        let backend = backend();
        let controller = ready(&backend).await;
        for _ in 0..4 {
            controller.dispatch(Command::CreateBackup { confirmed: true }).await;
        }

        let message = controller.dispatch(Command::CheckBackupStatus).await.notice.unwrap().message;
        assert!(message.contains("バックアップファイル数: 4件"));
        assert!(!message.contains("_1.backup"));
        let second = message.find("_2.backup").unwrap();
        let third = message.find("_3.backup").unwrap();
        let fourth = message.find("_4.backup").unwrap();
        assert!(second < third && third < fourth);
    }

    #[tokio::test]
    async fn test_register_vendor_validates_and_reloads() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller.dispatch(Command::RegisterVendor(NewVendor::default())).await;
        assert_eq!(outcome.notice.unwrap().severity, Severity::Danger);
        assert!(!backend.calls().contains(&"create_vendor".to_string()));

        let vendor = NewVendor {
            name: "鈴木設備".into(),
            bank_name: "りそな銀行".into(),
            branch_name: "大阪支店".into(),
            account_type: AccountType::Checking,
            account_number: "1112223".into(),
            account_holder: "スズキセツビ".into(),
        };
        let outcome = controller.dispatch(Command::RegisterVendor(vendor)).await;
        assert_eq!(outcome.notice.unwrap().message, "業者を登録しました");
        assert_eq!(controller.session().await.directory.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_company_search_and_select() {
        let backend = backend();
        let controller = ready(&backend).await;

        let outcome = controller.dispatch(Command::SearchCompanies("AB".into())).await;
        assert_eq!(outcome.effect, Effect::Suggestions { field: SearchField::Company });
        {
            let session = controller.session().await;
            let names: Vec<&str> = session.company_suggestions.results.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["ABC Trading", "Tabby Co"]);
            assert!(session.header.remittance_company.is_empty());
        }

        controller.dispatch(Command::SelectCompany("Tabby Co".into())).await;
        {
            let session = controller.session().await;
            assert_eq!(session.header.company_query, "Tabby Co");
            assert_eq!(session.header.remittance_company, "Tabby Co");
            assert!(!session.company_suggestions.open);
        }

        controller.dispatch(Command::SearchCompanies("  ".into())).await;
        assert!(controller.session().await.header.remittance_company.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_company_search_is_not_capped() {
        let companies: Vec<RemittanceCompany> = (1..=12).map(|n| company(&format!("AB Co {}", n))).collect();
        let backend = Arc::new(MemoryBackend::new().with_companies(companies));
        let controller = ready(&backend).await;
        assert_eq!(Config::default().search.max_suggestions, 10);

        controller.dispatch(Command::SearchCompanies("ab".into())).await;
        assert_eq!(controller.session().await.company_suggestions.results.len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_vendor_search_yields_nothing() {
        let backend = backend();
        let controller = Arc::new(ready(&backend).await);

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.dispatch(Command::SearchVendors("山".into())).await })
        };
        tokio::task::yield_now().await;

        let second = controller.dispatch(Command::SearchVendors("佐藤".into())).await;
        assert_eq!(second.effect, Effect::Suggestions { field: SearchField::Vendor });
        assert!(first.await.unwrap().is_superseded());

        let session = controller.session().await;
        assert_eq!(session.vendor_suggestions.query, "佐藤");
        assert_eq!(session.vendor_suggestions.results.len(), 1);
        assert_eq!(
            backend.calls().iter().filter(|c| c.as_str() == "search_vendors").count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_vendor_closes_suggestions() {
        let backend = backend();
        let controller = ready(&backend).await;

        controller.dispatch(Command::SearchVendors("商店".into())).await;
        assert!(controller.session().await.vendor_suggestions.open);

        controller.dispatch(Command::SelectVendor(1)).await;
        let session = controller.session().await;
        assert_eq!(session.entry.vendor_id, Some(1));
        assert_eq!(session.entry.vendor_query, "山田商店");
        assert!(!session.vendor_suggestions.open);
    }

    #[tokio::test]
    async fn test_draft_snapshot() {
        let backend = backend();
        let controller = ready(&backend).await;
        fill_header(&controller).await;
        controller.dispatch(Command::AddItem(ItemForm::new(1, 1234, "資材", ""))).await;

        let snapshot = controller.session().await.snapshot();
        assert_eq!(snapshot.total_display, "1,234");
        assert!(snapshot.can_submit);
        assert_eq!(snapshot.remittance_company, "ABC Trading");
    }

    #[tokio::test]
    async fn test_download_proxies_backend() {
        let backend = backend();
        let controller = ready(&backend).await;

        let download = controller.download(Artifact::Pdf, "20240520_090000").await.unwrap();
        assert!(download.filename.ends_with(".pdf"));

        let missing = controller.download(Artifact::Transfer, "nope").await;
        assert!(matches!(missing, Err(CoreError::Backend { .. })));
    }
}
