//! Vendor partials - HTMX fragment responses

use super::page::{render_vendor_form, render_vendor_list};
use crate::routes::payments::page::{render_vendor_field, render_vendor_suggestions};
use crate::{htmx_reply, is_failure, notice_only, oob, AppState, WebError};
use axum::extract::{Form, Query, State};
use axum::response::Response;
use remitdesk_client::{AccountType, NewVendor};
use remitdesk_core::Command;
use serde::Deserialize;

/// Registration form as posted; every field arrives as text
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VendorForm {
    pub name: String,
    pub bank_name: String,
    pub branch_name: String,
    pub account_type: String,
    pub account_number: String,
    pub account_holder: String,
}

impl VendorForm {
    pub fn into_new_vendor(self) -> Result<NewVendor, WebError> {
        let account_type = if self.account_type.trim().is_empty() {
            AccountType::default()
        } else {
            self.account_type.parse::<AccountType>().map_err(WebError::bad_request)?
        };
        Ok(NewVendor {
            name: self.name,
            bank_name: self.bank_name,
            branch_name: self.branch_name,
            account_type,
            account_number: self.account_number,
            account_holder: self.account_holder,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub vendor_id: String,
}

/// Reload the directory and render the vendor table
pub async fn htmx_vendors_list(State(state): State<AppState>) -> Response {
    let outcome = state.controller.dispatch(Command::ReloadVendors).await;
    let body = render_vendor_list(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_register_vendor(
    State(state): State<AppState>,
    Form(form): Form<VendorForm>,
) -> Result<Response, WebError> {
    let vendor = form.into_new_vendor()?;

    let outcome = state.controller.dispatch(Command::RegisterVendor(vendor)).await;
    if is_failure(&outcome) {
        return Ok(notice_only(&state, &outcome));
    }

    let body = format!(
        "{}{}",
        render_vendor_form(),
        oob(&render_vendor_list(&*state.controller.session().await))
    );
    Ok(htmx_reply(&state, &outcome, body))
}

pub async fn htmx_vendor_search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let outcome = state.controller.dispatch(Command::SearchVendors(query.q)).await;
    let body = render_vendor_suggestions(&*state.controller.session().await);
    htmx_reply(&state, &outcome, body)
}

pub async fn htmx_vendor_select(
    State(state): State<AppState>,
    Form(form): Form<SelectForm>,
) -> Result<Response, WebError> {
    let vendor_id: u64 = form
        .vendor_id
        .trim()
        .parse()
        .map_err(|_| WebError::bad_request(format!("invalid vendor id: {}", form.vendor_id)))?;

    let outcome = state.controller.dispatch(Command::SelectVendor(vendor_id)).await;
    if is_failure(&outcome) {
        return Ok(notice_only(&state, &outcome));
    }

    let body = render_vendor_field(&*state.controller.session().await);
    Ok(htmx_reply(&state, &outcome, body))
}
