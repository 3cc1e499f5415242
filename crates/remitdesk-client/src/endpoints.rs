//! Backend REST paths

use serde::{Deserialize, Serialize};
use urlencoding::encode;

pub const VENDORS: &str = "/api/vendors";
pub const COMPANIES: &str = "/api/companies";
pub const PAYMENTS: &str = "/api/payments";
pub const UPLOAD_FILE: &str = "/api/upload-file";
pub const UPLOAD_FILES: &str = "/api/upload-files";
pub const BACKUP_CREATE: &str = "/api/backup/create";
pub const BACKUP_RESTORE: &str = "/api/backup/restore";
pub const BACKUP_STATUS: &str = "/api/backup/status";

/// Downloadable artifacts keyed by payment id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Artifact {
    /// Rendered payment list
    Pdf,
    /// Bank transfer file
    Transfer,
}

impl Artifact {
    pub fn path(self, payment_id: &str) -> String {
        match self {
            Artifact::Pdf => format!("{}/{}/pdf", PAYMENTS, encode(payment_id)),
            Artifact::Transfer => format!("{}/{}/transfer", PAYMENTS, encode(payment_id)),
        }
    }

    /// File name used when the backend does not send one
    pub fn default_filename(self, payment_id: &str) -> String {
        match self {
            Artifact::Pdf => format!("payment_list_{}.pdf", payment_id),
            Artifact::Transfer => format!("transfer_{}.csv", payment_id),
        }
    }

    pub fn default_content_type(self) -> &'static str {
        match self {
            Artifact::Pdf => "application/pdf",
            Artifact::Transfer => "text/csv",
        }
    }
}

impl std::str::FromStr for Artifact {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Artifact::Pdf),
            "transfer" => Ok(Artifact::Transfer),
            _ => Err(format!("Unknown artifact: {}", s)),
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Artifact::Pdf => write!(f, "pdf"),
            Artifact::Transfer => write!(f, "transfer"),
        }
    }
}

pub fn vendor_search(query: &str) -> String {
    format!("{}/search?q={}", VENDORS, encode(query))
}

pub fn payment(payment_id: &str) -> String {
    format!("{}/{}", PAYMENTS, encode(payment_id))
}

pub fn delete_file(filename: &str) -> String {
    format!("/api/delete-file/{}", encode(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_are_keyed_by_id() {
        assert_eq!(Artifact::Pdf.path("20240601_101500"), "/api/payments/20240601_101500/pdf");
        assert_eq!(Artifact::Transfer.path("20240601_101500"), "/api/payments/20240601_101500/transfer");
        assert_eq!(Artifact::Pdf.default_filename("7"), "payment_list_7.pdf");
    }

    #[test]
    fn test_query_and_filename_are_encoded() {
        assert_eq!(vendor_search("A&B"), "/api/vendors/search?q=A%26B");
        assert_eq!(delete_file("master list.csv"), "/api/delete-file/master%20list.csv");
    }
}
