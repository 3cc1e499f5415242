//! Payment history routes

pub mod api;
pub mod page;

pub use api::{htmx_delete_payment, htmx_download_pdf, htmx_history_list, htmx_history_transfer, htmx_recreate};
pub use page::page_history;
