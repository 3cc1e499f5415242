//! Enumerated codes shared by the wire models

use serde::{Deserialize, Serialize};

/// Bank account type as coded by the backend (1 = ordinary, 2 = checking)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccountType {
    /// 普通預金
    Ordinary,
    /// 当座預金
    Checking,
}

impl Default for AccountType {
    fn default() -> Self {
        AccountType::Ordinary
    }
}

impl AccountType {
    pub fn code(self) -> u8 {
        match self {
            AccountType::Ordinary => 1,
            AccountType::Checking => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccountType::Ordinary => "普通",
            AccountType::Checking => "当座",
        }
    }
}

impl TryFrom<u8> for AccountType {
    type Error = String;
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(AccountType::Ordinary),
            2 => Ok(AccountType::Checking),
            _ => Err(format!("Invalid account type code: {}", code)),
        }
    }
}

impl From<AccountType> for u8 {
    fn from(value: AccountType) -> Self {
        value.code()
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "普通" | "普通預金" => Ok(AccountType::Ordinary),
            "2" | "当座" | "当座預金" => Ok(AccountType::Checking),
            other => Err(format!("Invalid account type: {}", other)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where a vendor record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorSource {
    /// Registered through the vendor form
    Manual,
    /// Imported from an uploaded master-data file
    Upload,
}

impl Default for VendorSource {
    fn default() -> Self {
        VendorSource::Manual
    }
}

impl std::fmt::Display for VendorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VendorSource::Manual => write!(f, "manual"),
            VendorSource::Upload => write!(f, "upload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_wire_codes() {
        assert_eq!(serde_json::to_string(&AccountType::Checking).unwrap(), "2");
        let parsed: AccountType = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, AccountType::Ordinary);
        assert!(serde_json::from_str::<AccountType>("7").is_err());
    }

    #[test]
    fn test_account_type_from_form_value() {
        assert_eq!("2".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert_eq!("普通預金".parse::<AccountType>().unwrap(), AccountType::Ordinary);
        assert!("savings".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_vendor_source_serde() {
        assert_eq!(serde_json::to_string(&VendorSource::Upload).unwrap(), "\"upload\"");
        let parsed: VendorSource = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(parsed, VendorSource::Manual);
    }
}
