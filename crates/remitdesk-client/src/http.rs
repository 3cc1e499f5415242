//! HTTP implementation of the backend trait

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::endpoints::{self, Artifact};
use crate::error::{ClientError, ClientResult};
use crate::models::*;
use crate::PaymentBackend;

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| ClientError::InvalidUrl { url: base_url.clone() })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::warn!("backend answered {} for {}", status, path);

        match error_text(&body) {
            Some(message) => Err(ClientError::Status { status: status.as_u16(), message }),
            None if status == StatusCode::NOT_FOUND => Err(ClientError::NotFound { resource: path.to_string() }),
            None => Err(ClientError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        log::debug!("GET {}", path);
        let response = self.send(self.client.get(self.url(path)), path).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_action<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> ClientResult<T> {
        log::debug!("POST {}", path);
        let mut request = self.client.post(self.url(path));
        request = match body {
            Some(body) => request.json(body),
            None => request.json(&serde_json::json!({})),
        };
        let response = self.send(request, path).await?;
        receipt(response.json::<Value>().await?)
    }

    async fn delete_action(&self, path: &str) -> ClientResult<ActionReceipt> {
        log::debug!("DELETE {}", path);
        let response = self.send(self.client.delete(self.url(path)), path).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ActionReceipt::default());
        }
        receipt(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl PaymentBackend for HttpBackend {
    async fn list_vendors(&self) -> ClientResult<Vec<Vendor>> {
        self.get_json(endpoints::VENDORS).await
    }

    async fn create_vendor(&self, vendor: &NewVendor) -> ClientResult<Vendor> {
        let body = serde_json::to_value(vendor)?;
        let mut created: Value = self.post_action(endpoints::VENDORS, Some(&body)).await?;
        let vendor = created
            .get_mut("vendor")
            .map(Value::take)
            .ok_or_else(|| ClientError::Decode { message: "response has no vendor".to_string() })?;
        Ok(serde_json::from_value(vendor)?)
    }

    async fn search_vendors(&self, query: &str) -> ClientResult<Vec<Vendor>> {
        self.get_json(&endpoints::vendor_search(query)).await
    }

    async fn list_companies(&self) -> ClientResult<Vec<RemittanceCompany>> {
        self.get_json(endpoints::COMPANIES).await
    }

    async fn list_payments(&self) -> ClientResult<Vec<PaymentRecord>> {
        self.get_json(endpoints::PAYMENTS).await
    }

    async fn get_payment(&self, payment_id: &str) -> ClientResult<PaymentRecord> {
        self.get_json(&endpoints::payment(payment_id)).await
    }

    async fn create_payment(&self, payment: &NewPayment) -> ClientResult<PaymentReceipt> {
        let body = serde_json::to_value(payment)?;
        self.post_action(endpoints::PAYMENTS, Some(&body)).await
    }

    async fn delete_payment(&self, payment_id: &str) -> ClientResult<ActionReceipt> {
        self.delete_action(&endpoints::payment(payment_id)).await
    }

    async fn download(&self, artifact: Artifact, payment_id: &str) -> ClientResult<Download> {
        let path = artifact.path(payment_id);
        log::debug!("GET {}", path);
        let response = self.send(self.client.get(self.url(&path)), &path).await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(artifact.default_content_type())
            .to_string();
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| artifact.default_filename(payment_id));

        let body = response.bytes().await?;
        Ok(Download { filename, content_type, body })
    }

    async fn upload_file(&self, filename: &str, content: Vec<u8>) -> ClientResult<UploadReceipt> {
        log::debug!("POST {} ({} bytes)", endpoints::UPLOAD_FILE, content.len());
        let part = Part::bytes(content).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        let request = self.client.post(self.url(endpoints::UPLOAD_FILE)).multipart(form);
        let response = self.send(request, endpoints::UPLOAD_FILE).await?;
        receipt(response.json::<Value>().await?)
    }

    async fn list_uploaded_files(&self) -> ClientResult<Vec<UploadedFile>> {
        self.get_json(endpoints::UPLOAD_FILES).await
    }

    async fn delete_uploaded_file(&self, filename: &str) -> ClientResult<ActionReceipt> {
        self.delete_action(&endpoints::delete_file(filename)).await
    }

    async fn create_backup(&self) -> ClientResult<BackupReceipt> {
        self.post_action(endpoints::BACKUP_CREATE, None).await
    }

    async fn restore_backup(&self) -> ClientResult<RestoreReceipt> {
        self.post_action(endpoints::BACKUP_RESTORE, None).await
    }

    async fn backup_status(&self) -> ClientResult<BackupStatus> {
        let value: Value = self.get_json(endpoints::BACKUP_STATUS).await?;
        receipt(value)
    }
}

/// Check the `success` flag of an action body and decode the rest
fn receipt<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("処理に失敗しました")
            .to_string();
        return Err(ClientError::Rejected { message });
    }
    Ok(serde_json::from_value(value)?)
}

/// `error` text of a JSON error body
fn error_text(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error").and_then(Value::as_str).map(str::to_string)
}

fn disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_receipt_rejects_unsuccessful_body() {
        let err = receipt::<ActionReceipt>(json!({"success": false, "error": "支払データが見つかりません"})).unwrap_err();
        assert!(matches!(err, ClientError::Rejected { ref message } if message == "支払データが見つかりません"));
    }

    #[test]
    fn test_receipt_decodes_successful_body() {
        let receipt: BackupReceipt = receipt(json!({"success": true, "payments_count": 4, "vendors_count": 12})).unwrap();
        assert_eq!(receipt.payments_count, 4);
        assert_eq!(receipt.vendors_count, 12);
    }

    #[test]
    fn test_error_text() {
        assert_eq!(error_text(r#"{"error": "ファイルが見つかりません"}"#).as_deref(), Some("ファイルが見つかりません"));
        assert_eq!(error_text("<html>oops</html>"), None);
    }

    #[test]
    fn test_disposition_filename() {
        assert_eq!(
            disposition_filename("attachment; filename=transfer_20240601_101500.csv").as_deref(),
            Some("transfer_20240601_101500.csv")
        );
        assert_eq!(disposition_filename("attachment; filename=\"a.pdf\"").as_deref(), Some("a.pdf"));
        assert_eq!(disposition_filename("inline"), None);
    }

    #[test]
    fn test_new_rejects_bad_url_and_trims_slash() {
        assert!(matches!(
            HttpBackend::new("not a url", Duration::from_secs(1)),
            Err(ClientError::InvalidUrl { .. })
        ));
        let backend = HttpBackend::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
    }
}
