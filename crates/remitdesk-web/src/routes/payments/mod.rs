//! Payment draft routes - header fields, entry form, submission

pub mod api;
pub mod page;

pub use api::{
    htmx_add_item, htmx_company_search, htmx_company_select, htmx_dismiss_suggestions, htmx_download_transfer,
    htmx_remove_item, htmx_set_payment_date, htmx_submit,
};
pub use page::page_payment;
