//! Vendor routes - list, registration, vendor search for the entry form

pub mod api;
pub mod page;

pub use api::{htmx_register_vendor, htmx_vendor_search, htmx_vendor_select, htmx_vendors_list};
pub use page::page_vendors;
