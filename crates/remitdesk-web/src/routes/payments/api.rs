//! Payment draft partials - HTMX fragment responses
//!
//! Endpoints:
//! - htmx_set_payment_date: Payment date (draft panel)
//! - htmx_add_item / htmx_remove_item: Line items (entry form, draft panel)
//! - htmx_submit: Submission (draft panel)
//! - htmx_download_transfer: Transfer file of the current payment (redirect)
//! - htmx_company_search / htmx_company_select: Company lookup
//! - htmx_dismiss_suggestions: Close a suggestion panel

use super::page::{
    render_company_field, render_company_selected, render_company_suggestions, render_draft_panel,
    render_entry_form, render_suggestions,
};
use crate::{htmx_reply, is_failure, notice_only, oob, AppState, WebError};
use axum::extract::{Form, Path, Query, State};
use axum::response::Response;
use remitdesk_core::{Command, ItemForm, ItemId, SearchField};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DateForm {
    #[serde(default)]
    pub payment_date: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CompanyForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DismissQuery {
    pub field: String,
}

pub async fn htmx_set_payment_date(State(state): State<AppState>, Form(form): Form<DateForm>) -> Response {
    let outcome = state.controller.dispatch(Command::SetPaymentDate(form.payment_date)).await;
    let body = render_draft_panel(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_add_item(State(state): State<AppState>, Form(form): Form<ItemForm>) -> Response {
    let outcome = state.controller.dispatch(Command::AddItem(form)).await;
    if is_failure(&outcome) {
        return notice_only(&state, &outcome);
    }

    let body = {
        let session = state.controller.session().await;
        format!("{}{}", render_entry_form(&session), oob(&render_draft_panel(&session)))
    };
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_remove_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id: ItemId = id
        .parse()
        .map_err(|_| WebError::bad_request(format!("invalid item id: {}", id)))?;

    let outcome = state.controller.dispatch(Command::RemoveItem(id)).await;
    let body = render_draft_panel(&*state.controller.session().await);
    Ok(htmx_reply(&state, &outcome, body))
}

pub async fn htmx_submit(State(state): State<AppState>) -> Response {
    let outcome = state.controller.dispatch(Command::Submit).await;
    let body = render_draft_panel(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_download_transfer(State(state): State<AppState>) -> Response {
    let outcome = state.controller.dispatch(Command::DownloadTransfer(None)).await;
    htmx_reply(&state, &outcome, String::new())
}

pub async fn htmx_company_search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let outcome = state.controller.dispatch(Command::SearchCompanies(query.q)).await;
    let body = {
        let session = state.controller.session().await;
        format!(
            "{}{}{}",
            render_company_suggestions(&session),
            oob(&render_company_selected(&session)),
            oob(&render_draft_panel(&session))
        )
    };
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_company_select(State(state): State<AppState>, Form(form): Form<CompanyForm>) -> Response {
    let outcome = state.controller.dispatch(Command::SelectCompany(form.name)).await;
    let body = {
        let session = state.controller.session().await;
        format!("{}{}", render_company_field(&session), oob(&render_draft_panel(&session)))
    };
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_dismiss_suggestions(
    State(state): State<AppState>,
    Query(query): Query<DismissQuery>,
) -> Result<Response, WebError> {
    let field: SearchField = query.field.parse().map_err(WebError::bad_request)?;

    let outcome = state.controller.dispatch(Command::DismissSuggestions(field)).await;
    let body = render_suggestions(&*state.controller.session().await, field);
    Ok(htmx_reply(&state, &outcome, body))
}
