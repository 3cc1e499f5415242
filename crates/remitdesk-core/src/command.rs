//! Commands accepted by the controller and what they produce

use remitdesk_client::{Artifact, NewVendor};
use serde::Serialize;

use crate::draft::{ItemForm, ItemId};
use crate::notice::Notice;

/// Input fields with a suggestion panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Vendor,
    Company,
}

impl SearchField {
    /// Debounce key
    pub fn key(&self) -> &'static str {
        match self {
            SearchField::Vendor => "vendor-search",
            SearchField::Company => "company-search",
        }
    }
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vendor" => Ok(SearchField::Vendor),
            "company" => Ok(SearchField::Company),
            other => Err(format!("unknown search field: {}", other)),
        }
    }
}

/// Console sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Payment,
    Upload,
    Vendors,
    History,
}

#[derive(Debug, Clone)]
pub enum Command {
    /// Load every cache in parallel and default the payment date to today
    Initialize,
    ReloadVendors,
    RegisterVendor(NewVendor),
    SearchVendors(String),
    SelectVendor(u64),
    SearchCompanies(String),
    SelectCompany(String),
    DismissSuggestions(SearchField),
    SetPaymentDate(String),
    AddItem(ItemForm),
    RemoveItem(ItemId),
    LoadFromHistory(String),
    Submit,
    DownloadPdf(String),
    /// Transfer file for the given payment, or the current one when `None`
    DownloadTransfer(Option<String>),
    LoadHistory,
    DeletePayment { payment_id: String, confirmed: bool },
    UploadFile { filename: String, content: Vec<u8> },
    LoadUploadedFiles,
    DeleteUploadedFile { filename: String, confirmed: bool },
    CreateBackup { confirmed: bool },
    RestoreBackup { confirmed: bool },
    CheckBackupStatus,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialize => "initialize",
            Command::ReloadVendors => "reload_vendors",
            Command::RegisterVendor(_) => "register_vendor",
            Command::SearchVendors(_) => "search_vendors",
            Command::SelectVendor(_) => "select_vendor",
            Command::SearchCompanies(_) => "search_companies",
            Command::SelectCompany(_) => "select_company",
            Command::DismissSuggestions(_) => "dismiss_suggestions",
            Command::SetPaymentDate(_) => "set_payment_date",
            Command::AddItem(_) => "add_item",
            Command::RemoveItem(_) => "remove_item",
            Command::LoadFromHistory(_) => "load_from_history",
            Command::Submit => "submit",
            Command::DownloadPdf(_) => "download_pdf",
            Command::DownloadTransfer(_) => "download_transfer",
            Command::LoadHistory => "load_history",
            Command::DeletePayment { .. } => "delete_payment",
            Command::UploadFile { .. } => "upload_file",
            Command::LoadUploadedFiles => "load_uploaded_files",
            Command::DeleteUploadedFile { .. } => "delete_uploaded_file",
            Command::CreateBackup { .. } => "create_backup",
            Command::RestoreBackup { .. } => "restore_backup",
            Command::CheckBackupStatus => "check_backup_status",
        }
    }
}

/// What the presentation layer should do after a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Re-render from session state
    None,
    /// A suggestion panel changed
    Suggestions { field: SearchField },
    /// A newer search replaced this one; render nothing
    Superseded,
    /// Ask the operator, then resend with `confirmed`
    ConfirmationRequired { prompt: String },
    /// Fetch a backend artifact
    Download { artifact: Artifact, payment_id: String },
    /// Bring a section into view
    Show { section: Section },
    /// Reload the whole page
    ReloadPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub notice: Option<Notice>,
    pub effect: Effect,
}

impl Outcome {
    pub fn none() -> Self {
        Self { notice: None, effect: Effect::None }
    }

    pub fn effect(effect: Effect) -> Self {
        Self { notice: None, effect }
    }

    pub fn notice(notice: Notice) -> Self {
        Self { notice: Some(notice), effect: Effect::None }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn is_superseded(&self) -> bool {
        self.effect == Effect::Superseded
    }
}
