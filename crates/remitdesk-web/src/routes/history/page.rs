//! Payment history page rendering

use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use remitdesk_core::Session;
use remitdesk_utils::{escape_html, format_number};

pub async fn page_history(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let notice = state.notice_html(state.controller.session().await.notices.active(), false);

    let inner_content = r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>支払履歴</h2>
            <p class='text-gray-500 mt-1'>作成済みの支払表を確認・再利用します</p>
        </div>
        <div id='history-list' hx-get='/history/list' hx-trigger='load' hx-swap='outerHTML'>
            <div class='text-center text-gray-500 py-8'>読み込み中...</div>
        </div>"#;

    Html(crate::page_response(&headers, "支払履歴", "/history", inner_content, &notice))
}

pub(crate) fn render_history_list(session: &Session) -> String {
    let mut rows = String::new();
    for record in &session.history {
        let id = urlencoding::encode(&record.id);
        let id = escape_html(&id);
        rows.push_str(&format!(
            r#"<tr class='border-t'>
                <td class='px-4 py-2 text-gray-500'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 font-medium'>{}</td>
                <td class='px-4 py-2 text-right'>{}件</td>
                <td class='px-4 py-2 text-right font-mono'>{}円</td>
                <td class='px-4 py-2'>
                    <div class='flex justify-end gap-2'>
                        <button type='button' class='text-indigo-600 hover:underline' hx-post='/history/{id}/recreate' hx-swap='none'>再作成</button>
                        <button type='button' class='text-indigo-600 hover:underline' hx-post='/history/{id}/pdf' hx-swap='none'>PDF</button>
                        <button type='button' class='text-indigo-600 hover:underline' hx-post='/history/{id}/transfer' hx-swap='none'>振込ファイル</button>
                        <button type='button' class='text-red-600 hover:underline' hx-post='/history/{id}/delete' hx-target='#history-list' hx-swap='outerHTML'>削除</button>
                    </div>
                </td>
            </tr>"#,
            escape_html(&record.created_at_display()),
            escape_html(&record.payment_date_display()),
            escape_html(&record.remittance_company),
            record.items.len(),
            format_number(record.total()),
            id = id
        ));
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan='6' class='px-4 py-8 text-center text-gray-500'>支払履歴がありません</td></tr>");
    }

    format!(
        r#"<div id='history-list' class='bg-white rounded-xl shadow-sm overflow-hidden'>
            <table class='w-full text-sm'>
                <thead class='bg-gray-50 text-gray-600'><tr>
                    <th class='px-4 py-2 text-left'>作成日時</th>
                    <th class='px-4 py-2 text-left'>支払日</th>
                    <th class='px-4 py-2 text-left'>送金会社</th>
                    <th class='px-4 py-2 text-right'>項目数</th>
                    <th class='px-4 py-2 text-right'>合計金額</th>
                    <th class='px-4 py-2'></th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        rows
    )
}
