//! Operator console served over HTTP with HTMX
//!
//! Routes are organized into modules:
//! - routes::payments: draft page, header fields, entry form, submission
//! - routes::vendors: vendor list, registration, vendor search
//! - routes::history: payment history, recreate, delete, downloads
//! - routes::uploads: master-data files and the backup panel
//! - routes::downloads: PDF / transfer file proxy

pub mod error;
pub mod routes;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use remitdesk_client::Artifact;
use remitdesk_config::Config;
use remitdesk_core::{Controller, DraftSnapshot, Effect, Notice, NoticeAction, Outcome, Section, Severity};
use remitdesk_utils::escape_html;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use error::WebError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
    pub config: Config,
}

impl AppState {
    pub fn new(controller: Arc<Controller>, config: Config) -> Self {
        Self { controller, config }
    }

    /// Notice container, swapped out-of-band when `oob` is set
    pub fn notice_html(&self, notice: Option<&Notice>, oob: bool) -> String {
        render_notice(notice, self.config.notices.dismiss_ms, oob)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::downloads::download_artifact;
    use routes::history::{
        htmx_delete_payment, htmx_download_pdf, htmx_history_list, htmx_history_transfer, htmx_recreate,
        page_history,
    };
    use routes::payments::{
        htmx_add_item, htmx_company_search, htmx_company_select, htmx_dismiss_suggestions,
        htmx_download_transfer, htmx_remove_item, htmx_set_payment_date, htmx_submit, page_payment,
    };
    use routes::uploads::{
        htmx_backup_create, htmx_backup_restore, htmx_backup_status, htmx_delete_upload, htmx_upload_file,
        htmx_uploads_list, page_uploads,
    };
    use routes::vendors::{
        htmx_register_vendor, htmx_vendor_search, htmx_vendor_select, htmx_vendors_list, page_vendors,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/draft", get(api_draft))
        // Pages
        .route("/", get(page_payment))
        .route("/uploads", get(page_uploads).post(htmx_upload_file))
        .route("/vendors", get(page_vendors).post(htmx_register_vendor))
        .route("/history", get(page_history))
        // Draft partials
        .route("/payments/date", post(htmx_set_payment_date))
        .route("/payments/items", post(htmx_add_item))
        .route("/payments/items/:id", delete(htmx_remove_item))
        .route("/payments/submit", post(htmx_submit))
        .route("/payments/transfer", post(htmx_download_transfer))
        .route("/companies/search", get(htmx_company_search))
        .route("/companies/select", post(htmx_company_select))
        .route("/suggestions/dismiss", post(htmx_dismiss_suggestions))
        // Vendor partials
        .route("/vendors/list", get(htmx_vendors_list))
        .route("/vendors/search", get(htmx_vendor_search))
        .route("/vendors/select", post(htmx_vendor_select))
        // History partials
        .route("/history/list", get(htmx_history_list))
        .route("/history/:id/recreate", post(htmx_recreate))
        .route("/history/:id/delete", post(htmx_delete_payment))
        .route("/history/:id/pdf", post(htmx_download_pdf))
        .route("/history/:id/transfer", post(htmx_history_transfer))
        // Upload and backup partials
        .route("/uploads/list", get(htmx_uploads_list))
        .route("/uploads/delete", post(htmx_delete_upload))
        .route("/backup/create", post(htmx_backup_create))
        .route("/backup/restore", post(htmx_backup_restore))
        .route("/backup/status", get(htmx_backup_status))
        // Downloads
        .route("/downloads/:id/:artifact", get(download_artifact))
        .route("/notice/clear", get(notice_clear))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Current draft (JSON API)
async fn api_draft(State(state): State<AppState>) -> Json<DraftSnapshot> {
    Json(state.controller.session().await.snapshot())
}

async fn notice_clear() -> Html<&'static str> {
    Html("<div id='notice'></div>")
}

// ==================== Responses ====================

/// Console path of a section
pub fn section_path(section: Section) -> &'static str {
    match section {
        Section::Payment => "/",
        Section::Upload => "/uploads",
        Section::Vendors => "/vendors",
        Section::History => "/history",
    }
}

/// Console URL that proxies a backend artifact
pub fn download_url(artifact: Artifact, payment_id: &str) -> String {
    format!("/downloads/{}/{}", urlencoding::encode(payment_id), artifact)
}

/// Mark a fragment for an out-of-band swap
pub fn oob(fragment: &str) -> String {
    match fragment.strip_prefix("<div ") {
        Some(rest) => format!("<div hx-swap-oob='true' {}", rest),
        None => fragment.to_string(),
    }
}

/// Turn a command outcome into an HTMX response.
///
/// `body` is swapped into the request's target; the notice rides along
/// out-of-band and the effect becomes response headers.
pub fn htmx_reply(state: &AppState, outcome: &Outcome, body: String) -> Response {
    let notice = state.notice_html(outcome.notice.as_ref(), true);
    let dialog = "<div id='dialog' hx-swap-oob='true'></div>";

    match &outcome.effect {
        Effect::Superseded => StatusCode::NO_CONTENT.into_response(),
        Effect::ReloadPage => ([("HX-Refresh", "true")], Html(notice)).into_response(),
        Effect::Download { artifact, payment_id } => {
            let url = download_url(*artifact, payment_id);
            ([("HX-Redirect", url)], Html(format!("{}{}", notice, dialog))).into_response()
        }
        Effect::Show { section } => {
            ([("HX-Redirect", section_path(*section))], Html(notice)).into_response()
        }
        Effect::ConfirmationRequired { prompt } => {
            let html = format!("<div class='p-4'>{}</div>", escape_html(prompt));
            ([("HX-Retarget", "#dialog"), ("HX-Reswap", "innerHTML")], Html(html)).into_response()
        }
        Effect::None | Effect::Suggestions { .. } => {
            Html(format!("{}{}{}", body, notice, dialog)).into_response()
        }
    }
}

/// Show the notice only and leave the target untouched (keeps typed input)
pub fn notice_only(state: &AppState, outcome: &Outcome) -> Response {
    let notice = state.notice_html(outcome.notice.as_ref(), true);
    ([("HX-Reswap", "none")], Html(notice)).into_response()
}

/// Whether the outcome carries a failure notice
pub fn is_failure(outcome: &Outcome) -> bool {
    matches!(
        outcome.notice.as_ref().map(|n| n.severity),
        Some(Severity::Danger) | Some(Severity::Warning)
    )
}

/// Confirmation dialog that resends the action with `confirmed=true`
pub fn confirm_reply(prompt: &str, action: &str, fields: &[(&str, &str)], target: Option<&str>) -> Response {
    let mut vals = serde_json::Map::new();
    for (key, value) in fields {
        vals.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    vals.insert("confirmed".to_string(), serde_json::Value::String("true".to_string()));
    let vals = serde_json::Value::Object(vals).to_string();

    let swap = match target {
        Some(target) => format!("hx-target='{}' hx-swap='outerHTML'", target),
        None => "hx-swap='none'".to_string(),
    };

    let html = format!(
        r#"<div class='fixed inset-0 bg-black bg-opacity-30 flex items-center justify-center z-40'>
    <div class='bg-white rounded-xl shadow-lg p-6 w-96'>
        <p class='mb-6 text-gray-800' style='white-space: pre-line'>{}</p>
        <div class='flex justify-end gap-2'>
            <button type='button' class='px-4 py-2 border border-gray-300 rounded-lg hover:bg-gray-50' onclick="document.getElementById('dialog').innerHTML = ''">キャンセル</button>
            <button type='button' class='px-4 py-2 bg-red-600 text-white rounded-lg hover:bg-red-700' hx-post='{}' hx-vals='{}' {}>実行</button>
        </div>
    </div>
</div>"#,
        escape_html(prompt),
        escape_html(action),
        escape_html(&vals),
        swap
    );

    ([("HX-Retarget", "#dialog"), ("HX-Reswap", "innerHTML")], Html(html)).into_response()
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Remitdesk</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <script>
        document.addEventListener('click', function (e) {{
            document.querySelectorAll('[data-suggestions]').forEach(function (panel) {{
                if (panel.dataset.open === 'true' && !panel.parentElement.contains(e.target)) {{
                    htmx.ajax('POST', '/suggestions/dismiss?field=' + panel.dataset.suggestions, {{ target: panel, swap: 'outerHTML' }});
                }}
            }});
        }});
    </script>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "支払表作成", "payment"),
        ("/uploads", "ファイル管理", "uploads"),
        ("/vendors", "業者管理", "vendors"),
        ("/history", "支払履歴", "history"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Remitdesk</h1><p class='text-xs text-gray-500'>支払管理</p></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "payment" => "💴",
            "uploads" => "📁",
            "vendors" => "🏢",
            "history" => "📋",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str, notice: &str) -> String {
    if is_htmx_request(headers) {
        format!("{}{}", inner_content, oob(notice))
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
    {}
    <div id='dialog'></div>
</div>"#,
                nav_sidebar(current_path),
                inner_content,
                notice
            ),
        )
    }
}

/// Transient notice; it asks for its own removal once the dismiss delay passes
pub fn render_notice(notice: Option<&Notice>, dismiss_ms: u64, oob: bool) -> String {
    let swap = if oob { " hx-swap-oob='true'" } else { "" };
    let notice = match notice {
        Some(notice) => notice,
        None => return format!("<div id='notice'{}></div>", swap),
    };

    let (colors, icon) = match notice.severity {
        Severity::Success => ("bg-green-50 border-green-200 text-green-800", "✓"),
        Severity::Warning => ("bg-yellow-50 border-yellow-200 text-yellow-800", "!"),
        Severity::Danger => ("bg-red-50 border-red-200 text-red-800", "✗"),
        Severity::Info => ("bg-blue-50 border-blue-200 text-blue-800", "i"),
    };

    let action = match &notice.action {
        Some(NoticeAction::DownloadPdf(payment_id)) => format!(
            r#"<button type='button' class='mt-2 px-3 py-1 bg-indigo-600 text-white text-sm rounded hover:bg-indigo-700' hx-post='/history/{}/pdf' hx-swap='none'>PDFをダウンロード</button>"#,
            escape_html(&urlencoding::encode(payment_id))
        ),
        None => String::new(),
    };

    format!(
        r#"<div id='notice'{} class='fixed top-4 right-4 z-50 max-w-md' hx-get='/notice/clear' hx-trigger='load delay:{}ms' hx-swap='outerHTML'>
    <div class='border rounded-lg shadow p-4 {}'>
        <div class='flex gap-2'><span class='font-bold'>{}</span><span style='white-space: pre-line'>{}</span></div>
        {}
    </div>
</div>"#,
        swap,
        dismiss_ms,
        colors,
        icon,
        escape_html(&notice.message),
        action
    )
}

/// Start the console
pub async fn start_server(config: Config, controller: Arc<Controller>) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    let backend_url = config.backend.base_url.clone();
    let state = AppState::new(controller, config);

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Remitdesk console on http://{}", addr);
    log::info!("Backend: {}", backend_url);
    log::info!("Available routes:");
    log::info!("  - / (Payment draft)");
    log::info!("  - /uploads (Master-data files and backups)");
    log::info!("  - /vendors (Vendor management)");
    log::info!("  - /history (Payment history)");
    log::info!("  - /api/* (JSON endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

// ==================== Tests ====================
