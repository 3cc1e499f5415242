//! Payment draft builder

use chrono::NaiveDate;
use remitdesk_client::{NewPayment, PaymentItem, PaymentRecord};
use remitdesk_utils::{format_number, IdSequence};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::directory::VendorDirectory;
use crate::error::{CoreError, CoreResult};

pub const REQUIRED_FIELDS_MESSAGE: &str = "業者、金額、摘要は必須項目です";
pub const INVALID_AMOUNT_MESSAGE: &str = "金額は1以上の整数で入力してください";
pub const EMPTY_DRAFT_MESSAGE: &str = "支払項目がありません";
pub const MISSING_HEADER_MESSAGE: &str = "支払日と送金会社名を入力してください";

/// Local identifier of a draft line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ItemId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLineItem {
    pub id: ItemId,
    pub vendor_id: u64,
    pub vendor_name: String,
    pub amount: i64,
    pub description: String,
    pub remarks: String,
}

impl PaymentLineItem {
    pub fn to_wire(&self) -> PaymentItem {
        PaymentItem {
            vendor_id: self.vendor_id,
            vendor_name: self.vendor_name.clone(),
            amount: self.amount,
            description: self.description.clone(),
            remarks: self.remarks.clone(),
        }
    }
}

/// Entry form values exactly as typed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub vendor_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub remarks: String,
}

impl ItemForm {
    pub fn new(vendor_id: u64, amount: i64, description: &str, remarks: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            amount: amount.to_string(),
            description: description.to_string(),
            remarks: remarks.to_string(),
        }
    }
}

/// Parse an amount field; `None` when blank or zero, error when malformed
fn parse_amount(raw: &str) -> CoreResult<Option<i64>> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<i64>() {
        Ok(0) => Ok(None),
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(CoreError::validation(INVALID_AMOUNT_MESSAGE)),
    }
}

/// Payment date and remittance company of the draft
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DraftHeader {
    pub payment_date: String,
    /// Text in the company search field
    pub company_query: String,
    /// Company name that gets submitted
    pub remittance_company: String,
}

impl DraftHeader {
    pub fn is_complete(&self) -> bool {
        !self.payment_date.trim().is_empty() && !self.remittance_company.trim().is_empty()
    }

    /// Set the payment date; blank clears it, anything else must be `YYYY-MM-DD`
    pub fn set_payment_date(&mut self, date: &str) -> CoreResult<()> {
        let date = date.trim();
        if !date.is_empty() && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(CoreError::validation("支払日の形式が正しくありません"));
        }
        self.payment_date = date.to_string();
        Ok(())
    }

    pub fn select_company(&mut self, name: &str) {
        self.company_query = name.to_string();
        self.remittance_company = name.to_string();
    }

    pub fn clear_company(&mut self) {
        self.company_query.clear();
        self.remittance_company.clear();
    }
}

/// Ordered list of line items being assembled
#[derive(Debug, Default)]
pub struct PaymentDraft {
    items: Vec<PaymentLineItem>,
    ids: IdSequence,
}

impl PaymentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PaymentLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate the form against the directory and append an item
    pub fn add_item(&mut self, form: &ItemForm, directory: &VendorDirectory) -> CoreResult<&PaymentLineItem> {
        let vendor_id = form.vendor_id.trim().parse::<u64>().ok().filter(|id| *id > 0);
        let amount = parse_amount(&form.amount);
        let description = form.description.trim();

        let (vendor_id, amount) = match (vendor_id, amount) {
            (Some(id), Ok(Some(amount))) if !description.is_empty() => (id, amount),
            (_, Err(e)) => return Err(e),
            _ => return Err(CoreError::validation(REQUIRED_FIELDS_MESSAGE)),
        };

        let vendor = directory
            .get(vendor_id)
            .ok_or(CoreError::VendorNotFound { id: vendor_id })?;

        self.items.push(PaymentLineItem {
            id: ItemId(self.ids.next_id()),
            vendor_id,
            vendor_name: vendor.name.clone(),
            amount,
            description: description.to_string(),
            remarks: form.remarks.trim().to_string(),
        });

        let added = self.items.len() - 1;
        Ok(&self.items[added])
    }

    /// Remove an item; unknown ids leave the draft untouched
    pub fn remove_item(&mut self, id: ItemId) -> Option<PaymentLineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn total(&self) -> i64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    pub fn total_display(&self) -> String {
        format_number(self.total())
    }

    pub fn can_submit(&self, header: &DraftHeader) -> bool {
        !self.items.is_empty() && header.is_complete()
    }

    /// Replace every item with copies of a record's items under fresh ids
    pub fn replace_from_record(&mut self, record: &PaymentRecord) {
        let ids = &self.ids;
        self.items = record
            .items
            .iter()
            .map(|item| PaymentLineItem {
                id: ItemId(ids.next_id()),
                vendor_id: item.vendor_id,
                vendor_name: item.vendor_name.clone(),
                amount: item.amount,
                description: item.description.clone(),
                remarks: item.remarks.clone(),
            })
            .collect();
    }

    /// Build the submission payload, re-checking the submit preconditions
    pub fn submission(&self, header: &DraftHeader) -> CoreResult<NewPayment> {
        if self.items.is_empty() {
            return Err(CoreError::DraftIncomplete { message: EMPTY_DRAFT_MESSAGE.to_string() });
        }
        if !header.is_complete() {
            return Err(CoreError::DraftIncomplete { message: MISSING_HEADER_MESSAGE.to_string() });
        }

        Ok(NewPayment {
            payment_date: header.payment_date.trim().to_string(),
            remittance_company: header.remittance_company.trim().to_string(),
            items: self.items.iter().map(PaymentLineItem::to_wire).collect(),
        })
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remitdesk_client::{AccountType, Vendor, VendorSource};

    fn directory() -> VendorDirectory {
        let vendor = |id: u64, name: &str| Vendor {
            id,
            name: name.to_string(),
            bank_name: "りそな銀行".to_string(),
            branch_name: "梅田支店".to_string(),
            account_type: AccountType::Checking,
            account_number: "0011223".to_string(),
            account_holder: name.to_string(),
            source: VendorSource::Manual,
            upload_source: None,
            bank_code: None,
            branch_code: None,
        };
        VendorDirectory::new(vec![vendor(1, "山田商店"), vendor(2, "佐藤工業")])
    }

    fn header() -> DraftHeader {
        DraftHeader {
            payment_date: "2024-06-30".to_string(),
            company_query: "株式会社サンプル".to_string(),
            remittance_company: "株式会社サンプル".to_string(),
        }
    }

    #[test]
    fn test_total_example() {
        let directory = directory();
        let mut draft = PaymentDraft::new();

        let first = draft.add_item(&ItemForm::new(1, 1000, "資材", ""), &directory).unwrap().id;
        draft.add_item(&ItemForm::new(2, 2500, "運送", "6月分"), &directory).unwrap();
        assert_eq!(draft.total_display(), "3,500");

        let removed = draft.remove_item(first).unwrap();
        assert_eq!(removed.amount, 1000);
        assert_eq!(draft.total_display(), "2,500");
        assert_eq!(draft.total(), draft.items().iter().map(|i| i.amount).sum::<i64>());
    }

    #[test]
    fn test_add_item_requires_fields() {
        let directory = directory();
        let mut draft = PaymentDraft::new();

        let cases = [
            ItemForm { vendor_id: "".into(), amount: "100".into(), description: "x".into(), remarks: "".into() },
            ItemForm { vendor_id: "1".into(), amount: "".into(), description: "x".into(), remarks: "".into() },
            ItemForm { vendor_id: "1".into(), amount: "0".into(), description: "x".into(), remarks: "".into() },
            ItemForm { vendor_id: "1".into(), amount: "100".into(), description: "   ".into(), remarks: "".into() },
        ];
        for form in &cases {
            let err = draft.add_item(form, &directory).unwrap_err();
            assert_eq!(err.user_message(), REQUIRED_FIELDS_MESSAGE);
        }
        assert!(draft.is_empty());
    }

    #[test]
    fn test_add_item_rejects_bad_amount_and_unknown_vendor() {
        let directory = directory();
        let mut draft = PaymentDraft::new();

        let negative = ItemForm { vendor_id: "1".into(), amount: "-5".into(), description: "x".into(), remarks: "".into() };
        assert_eq!(draft.add_item(&negative, &directory).unwrap_err().user_message(), INVALID_AMOUNT_MESSAGE);

        let text = ItemForm { vendor_id: "1".into(), amount: "abc".into(), description: "x".into(), remarks: "".into() };
        assert!(draft.add_item(&text, &directory).is_err());

        let unknown = ItemForm::new(99, 100, "x", "");
        assert!(matches!(draft.add_item(&unknown, &directory), Err(CoreError::VendorNotFound { id: 99 })));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_add_item_accepts_separators_and_resolves_name() {
        let directory = directory();
        let mut draft = PaymentDraft::new();

        let form = ItemForm { vendor_id: "2".into(), amount: "12,000".into(), description: " 運送費 ".into(), remarks: "".into() };
        let item = draft.add_item(&form, &directory).unwrap();
        assert_eq!(item.amount, 12000);
        assert_eq!(item.vendor_name, "佐藤工業");
        assert_eq!(item.description, "運送費");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let directory = directory();
        let mut draft = PaymentDraft::new();
        draft.add_item(&ItemForm::new(1, 500, "x", ""), &directory).unwrap();

        assert!(draft.remove_item(ItemId(0)).is_none());
        assert_eq!(draft.len(), 1);
    }

    #[test]
    fn test_can_submit() {
        let directory = directory();
        let mut draft = PaymentDraft::new();
        assert!(!draft.can_submit(&header()));

        draft.add_item(&ItemForm::new(1, 500, "x", ""), &directory).unwrap();
        assert!(draft.can_submit(&header()));

        let mut no_date = header();
        no_date.payment_date.clear();
        assert!(!draft.can_submit(&no_date));

        let mut no_company = header();
        no_company.clear_company();
        assert!(!draft.can_submit(&no_company));
    }

    #[test]
    fn test_submission_payload() {
        let directory = directory();
        let mut draft = PaymentDraft::new();
        assert!(matches!(draft.submission(&header()), Err(CoreError::DraftIncomplete { .. })));

        draft.add_item(&ItemForm::new(1, 500, "x", "memo"), &directory).unwrap();
        let payment = draft.submission(&header()).unwrap();
        assert_eq!(payment.payment_date, "2024-06-30");
        assert_eq!(payment.items.len(), 1);
        assert_eq!(payment.items[0].remarks, "memo");
    }

    #[test]
    fn test_replace_from_record() {
        let directory = directory();
        let mut draft = PaymentDraft::new();
        draft.add_item(&ItemForm::new(1, 999, "old", ""), &directory).unwrap();
        let old_id = draft.items()[0].id;

        let record = PaymentRecord {
            id: "20240601_101500".to_string(),
            payment_date: "2024-06-30".to_string(),
            remittance_company: "株式会社サンプル".to_string(),
            items: vec![
                PaymentItem { vendor_id: 2, vendor_name: "佐藤工業".into(), amount: 100, description: "a".into(), remarks: "".into() },
                PaymentItem { vendor_id: 7, vendor_name: "削除済".into(), amount: 200, description: "b".into(), remarks: "r".into() },
            ],
            created_at: String::new(),
        };
        draft.replace_from_record(&record);

        assert_eq!(draft.len(), 2);
        assert_eq!(draft.total(), 300);
        assert!(draft.items().iter().all(|item| item.id != old_id));
        assert_ne!(draft.items()[0].id, draft.items()[1].id);
        assert_eq!(record.items.len(), 2);
    }

    #[test]
    fn test_header_date_validation() {
        let mut header = DraftHeader::default();
        assert!(header.set_payment_date("2024/06/30").is_err());
        assert!(header.payment_date.is_empty());

        header.set_payment_date(" 2024-06-30 ").unwrap();
        assert_eq!(header.payment_date, "2024-06-30");

        header.set_payment_date("").unwrap();
        assert!(header.payment_date.is_empty());
    }
}
