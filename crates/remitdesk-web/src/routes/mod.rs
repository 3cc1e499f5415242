//! Route modules for the console
//!
//! Routes are grouped by console section:
//! - payments: Payment draft, company lookup, entry form, submission
//! - vendors: Vendor list, registration, vendor search
//! - history: Payment history and the actions on a past payment
//! - uploads: Master-data files and the backup panel
//! - downloads: Backend artifact proxy
//!
//! Each section module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: HTMX partial endpoints
//! - page.rs: Page and fragment rendering

pub mod downloads;
pub mod history;
pub mod payments;
pub mod uploads;
pub mod vendors;
