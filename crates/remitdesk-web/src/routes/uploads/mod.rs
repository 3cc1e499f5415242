//! File management routes - master-data uploads and backups

pub mod api;
pub mod page;

pub use api::{
    htmx_backup_create, htmx_backup_restore, htmx_backup_status, htmx_delete_upload, htmx_upload_file,
    htmx_uploads_list,
};
pub use page::page_uploads;
