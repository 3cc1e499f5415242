//! Vendor directory cache and remittance company lookup

use remitdesk_client::{RemittanceCompany, Vendor};
use serde::Serialize;
use std::sync::Arc;

/// Vendor counts by provenance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VendorStats {
    pub total: usize,
    pub manual: usize,
    pub uploaded: usize,
}

/// Last-fetched vendor set.
///
/// The set is only ever swapped whole, so a reader holding a snapshot keeps
/// seeing a complete old or complete new list.
#[derive(Debug, Clone, Default)]
pub struct VendorDirectory {
    vendors: Arc<Vec<Vendor>>,
    loaded: bool,
}

impl VendorDirectory {
    pub fn new(vendors: Vec<Vendor>) -> Self {
        Self {
            vendors: Arc::new(vendors),
            loaded: true,
        }
    }

    pub fn replace(&mut self, vendors: Vec<Vendor>) {
        self.vendors = Arc::new(vendors);
        self.loaded = true;
    }

    pub fn snapshot(&self) -> Arc<Vec<Vendor>> {
        Arc::clone(&self.vendors)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn get(&self, id: u64) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    pub fn stats(&self) -> VendorStats {
        let uploaded = self.vendors.iter().filter(|v| v.is_uploaded()).count();
        VendorStats {
            total: self.vendors.len(),
            manual: self.vendors.len() - uploaded,
            uploaded,
        }
    }
}

/// Company reference list, filtered locally
#[derive(Debug, Clone, Default)]
pub struct CompanyLookup {
    companies: Arc<Vec<RemittanceCompany>>,
}

impl CompanyLookup {
    pub fn new(companies: Vec<RemittanceCompany>) -> Self {
        Self {
            companies: Arc::new(companies),
        }
    }

    pub fn replace(&mut self, companies: Vec<RemittanceCompany>) {
        self.companies = Arc::new(companies);
    }

    pub fn companies(&self) -> &[RemittanceCompany] {
        &self.companies
    }

    /// Companies whose name contains `query`, ignoring case.
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<RemittanceCompany> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.companies
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remitdesk_client::{AccountType, VendorSource};

    fn vendor(id: u64, name: &str, source: VendorSource) -> Vendor {
        Vendor {
            id,
            name: name.to_string(),
            bank_name: "三井住友銀行".to_string(),
            branch_name: "新宿支店".to_string(),
            account_type: AccountType::Ordinary,
            account_number: format!("{:07}", id),
            account_holder: name.to_string(),
            source,
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

    #[test]
    fn test_replace_swaps_whole_set() {
        let mut directory = VendorDirectory::new(vec![vendor(1, "A", VendorSource::Manual)]);
        let before = directory.snapshot();

        directory.replace(vec![
            vendor(1, "B", VendorSource::Manual),
            vendor(2, "C", VendorSource::Upload),
        ]);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name, "A");
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get(2).map(|v| v.name.as_str()), Some("C"));
        assert!(directory.get(3).is_none());
    }

    #[test]
    fn test_stats() {
        let directory = VendorDirectory::new(vec![
            vendor(1, "A", VendorSource::Manual),
            vendor(2, "B", VendorSource::Upload),
            vendor(3, "C", VendorSource::Upload),
        ]);

        assert_eq!(directory.stats(), VendorStats { total: 3, manual: 1, uploaded: 2 });
        assert!(!VendorDirectory::default().is_loaded());
    }

    #[test]
    fn test_company_search_is_case_insensitive() {
        let lookup = CompanyLookup::new(vec![
            company("ABC Trading"),
            company("xyz Holdings"),
            company("Tabby Co"),
            company("株式会社Ab物産"),
        ]);

        let names: Vec<String> = lookup.search("AB").into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ABC Trading", "Tabby Co", "株式会社Ab物産"]);
    }

    #[test]
    fn test_company_search_blank_query() {
        let lookup = CompanyLookup::new(vec![company("A1"), company("A2"), company("A3")]);

        assert!(lookup.search("   ").is_empty());
        assert_eq!(lookup.search("a").len(), 3);
    }

    #[test]
    fn test_company_search_returns_every_match() {
        let companies: Vec<RemittanceCompany> = (1..=12).map(|n| company(&format!("AB Co {}", n))).collect();
        let lookup = CompanyLookup::new(companies);

        assert_eq!(lookup.search("ab").len(), 12);
    }
}
