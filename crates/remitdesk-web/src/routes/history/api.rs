//! Payment history partials - HTMX fragment responses
//!
//! Actions on a past payment are addressed by its id:
//! recreate, delete (confirmed), PDF and transfer downloads.

use super::page::render_history_list;
use crate::{confirm_reply, htmx_reply, AppState};
use axum::extract::{Form, Path, State};
use axum::response::Response;
use remitdesk_core::{Command, Effect};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirmed: bool,
}

/// Reload history from the backend and render the table
pub async fn htmx_history_list(State(state): State<AppState>) -> Response {
    let outcome = state.controller.dispatch(Command::LoadHistory).await;
    let body = render_history_list(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

/// Copy a past payment into the draft and switch to the payment page
pub async fn htmx_recreate(State(state): State<AppState>, Path(payment_id): Path<String>) -> Response {
    let outcome = state.controller.dispatch(Command::LoadFromHistory(payment_id)).await;
    htmx_reply(&state, &outcome, String::new())
}

pub async fn htmx_delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    let action = format!("/history/{}/delete", urlencoding::encode(&payment_id));
    let outcome = state
        .controller
        .dispatch(Command::DeletePayment { payment_id, confirmed: form.confirmed })
        .await;

    if let Effect::ConfirmationRequired { prompt } = &outcome.effect {
        return confirm_reply(prompt, &action, &[], Some("#history-list"));
    }

    let body = render_history_list(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_download_pdf(State(state): State<AppState>, Path(payment_id): Path<String>) -> Response {
    let outcome = state.controller.dispatch(Command::DownloadPdf(payment_id)).await;
    htmx_reply(&state, &outcome, String::new())
}

pub async fn htmx_history_transfer(State(state): State<AppState>, Path(payment_id): Path<String>) -> Response {
    let outcome = state.controller.dispatch(Command::DownloadTransfer(Some(payment_id))).await;
    htmx_reply(&state, &outcome, String::new())
}
