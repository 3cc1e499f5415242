//! Upload and backup partials - HTMX fragment responses

use super::page::{render_upload_form, render_upload_list};
use crate::{confirm_reply, htmx_reply, is_failure, notice_only, oob, AppState, WebError};
use axum::extract::{Form, Multipart, State};
use axum::response::Response;
use remitdesk_core::{Command, Effect};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUploadForm {
    pub filename: String,
    #[serde(default)]
    pub confirmed: bool,
}

/// Multipart upload; the file arrives in the `file` field
pub async fn htmx_upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response, WebError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(|e| WebError::bad_request(e.body_text()))?;
        upload = Some((filename, content.to_vec()));
    }
    let (filename, content) = upload.unwrap_or_default();

    let outcome = state.controller.dispatch(Command::UploadFile { filename, content }).await;
    if is_failure(&outcome) {
        return Ok(notice_only(&state, &outcome));
    }

    let body = format!(
        "{}{}",
        render_upload_form(),
        oob(&render_upload_list(&*state.controller.session().await))
    );
    Ok(htmx_reply(&state, &outcome, body))
}

/// Reload the uploaded-file list and render it
pub async fn htmx_uploads_list(State(state): State<AppState>) -> Response {
    let outcome = state.controller.dispatch(Command::LoadUploadedFiles).await;
    let body = render_upload_list(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_delete_upload(State(state): State<AppState>, Form(form): Form<DeleteUploadForm>) -> Response {
    let filename = form.filename.clone();
    let outcome = state
        .controller
        .dispatch(Command::DeleteUploadedFile { filename: form.filename, confirmed: form.confirmed })
        .await;

    if let Effect::ConfirmationRequired { prompt } = &outcome.effect {
        return confirm_reply(prompt, "/uploads/delete", &[("filename", &filename)], Some("#upload-list"));
    }

    let body = render_upload_list(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_backup_create(State(state): State<AppState>, Form(form): Form<ConfirmForm>) -> Response {
    let outcome = state.controller.dispatch(Command::CreateBackup { confirmed: form.confirmed }).await;
    if let Effect::ConfirmationRequired { prompt } = &outcome.effect {
        return confirm_reply(prompt, "/backup/create", &[], None);
    }
    htmx_reply(&state, &outcome, String::new())
}

pub async fn htmx_backup_restore(State(state): State<AppState>, Form(form): Form<ConfirmForm>) -> Response {
    let outcome = state.controller.dispatch(Command::RestoreBackup { confirmed: form.confirmed }).await;
    if let Effect::ConfirmationRequired { prompt } = &outcome.effect {
        return confirm_reply(prompt, "/backup/restore", &[], None);
    }
    htmx_reply(&state, &outcome, String::new())
}

pub async fn htmx_backup_status(State(state): State<AppState>) -> Response {
    let outcome = state.controller.dispatch(Command::CheckBackupStatus).await;
    htmx_reply(&state, &outcome, String::new())
}
