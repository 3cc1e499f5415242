//! Backend artifact proxy
//!
//! Serves the payment PDF and the bank transfer file as attachments so the
//! browser never talks to the backend directly.

use crate::{AppState, WebError};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use remitdesk_client::Artifact;

pub async fn download_artifact(
    State(state): State<AppState>,
    Path((payment_id, artifact)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let artifact: Artifact = artifact.parse().map_err(WebError::bad_request)?;

    let download = state.controller.download(artifact, &payment_id).await?;
    log::info!("serving {} for {} ({} bytes)", artifact, payment_id, download.body.len());

    let disposition = content_disposition(&download.filename);
    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(download.body),
    )
        .into_response())
}

/// Attachment header with an ASCII fallback and the UTF-8 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
