//! File management page rendering (master-data uploads and backups)

use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use remitdesk_core::Session;
use remitdesk_utils::{escape_html, format_file_size};

pub async fn page_uploads(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let notice = state.notice_html(state.controller.session().await.notices.active(), false);

    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>ファイル管理</h2>
            <p class='text-gray-500 mt-1'>業者マスタファイルの取り込みとデータのバックアップ</p>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='lg:col-span-2 space-y-6'>
                <section class='bg-white rounded-xl shadow-sm p-6'>
                    <h3 class='font-semibold text-gray-700 mb-4'>ファイルアップロード</h3>
                    {}
                </section>
                <div id='upload-list' hx-get='/uploads/list' hx-trigger='load' hx-swap='outerHTML'>
                    <div class='text-center text-gray-500 py-8'>読み込み中...</div>
                </div>
            </div>
            {}
        </div>"#,
        render_upload_form(),
        render_backup_panel()
    );

    Html(crate::page_response(&headers, "ファイル管理", "/uploads", &inner_content, &notice))
}

pub(crate) fn render_upload_form() -> String {
    r#"<form id='upload-form' hx-post='/uploads' hx-encoding='multipart/form-data' hx-target='#upload-form' hx-swap='outerHTML' class='flex items-center gap-3'>
            <input type='file' name='file' accept='.csv,.xlsx,.xls' class='flex-1 text-sm'>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>アップロード</button>
            <span class='htmx-indicator text-sm text-gray-500'>送信中...</span>
        </form>"#
        .to_string()
}

pub(crate) fn render_upload_list(session: &Session) -> String {
    let mut rows = String::new();
    for file in &session.uploaded_files {
        let vals = serde_json::json!({ "filename": file.filename }).to_string();
        rows.push_str(&format!(
            r#"<tr class='border-t'>
                <td class='px-4 py-2 font-medium'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-gray-500'>{}</td>
                <td class='px-4 py-2 text-right'><button type='button' class='text-red-600 hover:underline' hx-post='/uploads/delete' hx-vals='{}' hx-target='#upload-list' hx-swap='outerHTML'>削除</button></td>
            </tr>"#,
            escape_html(&file.filename),
            format_file_size(file.size),
            escape_html(&file.modified_display()),
            escape_html(&vals)
        ));
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan='4' class='px-4 py-8 text-center text-gray-500'>アップロードされたファイルがありません</td></tr>");
    }

    format!(
        r#"<div id='upload-list' class='bg-white rounded-xl shadow-sm overflow-hidden'>
            <table class='w-full text-sm'>
                <thead class='bg-gray-50 text-gray-600'><tr>
                    <th class='px-4 py-2 text-left'>ファイル名</th>
                    <th class='px-4 py-2 text-right'>サイズ</th>
                    <th class='px-4 py-2 text-left'>更新日時</th>
                    <th class='px-4 py-2'></th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        rows
    )
}

fn render_backup_panel() -> String {
    r#"<section class='bg-white rounded-xl shadow-sm p-6 space-y-3 h-fit'>
            <h3 class='font-semibold text-gray-700'>バックアップ</h3>
            <p class='text-sm text-gray-500'>支払データと業者データを保存・復元します</p>
            <button type='button' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700' hx-post='/backup/create' hx-swap='none'>バックアップ作成</button>
            <button type='button' class='w-full px-4 py-2 border border-red-600 text-red-600 rounded-lg hover:bg-red-50' hx-post='/backup/restore' hx-swap='none'>バックアップから復元</button>
            <button type='button' class='w-full px-4 py-2 border border-gray-300 rounded-lg hover:bg-gray-50' hx-get='/backup/status' hx-swap='none'>状態確認</button>
        </section>"#
        .to_string()
}
