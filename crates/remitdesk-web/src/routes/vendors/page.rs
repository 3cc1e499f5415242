//! Vendor management page rendering

use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use remitdesk_core::Session;
use remitdesk_utils::{escape_html, format_number};

pub async fn page_vendors(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = state.controller.session().await;

    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>業者管理</h2>
            <p class='text-gray-500 mt-1'>振込先の業者を登録・確認します</p>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <section class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold text-gray-700 mb-4'>業者登録</h3>
                {}
            </section>
            <section class='lg:col-span-2'>
                <div id='vendor-list' hx-get='/vendors/list' hx-trigger='load' hx-swap='outerHTML'>
                    <div class='text-center text-gray-500 py-8'>読み込み中...</div>
                </div>
            </section>
        </div>"#,
        render_vendor_form()
    );
    let notice = state.notice_html(session.notices.active(), false);

    Html(crate::page_response(&headers, "業者管理", "/vendors", &inner_content, &notice))
}

/// Registration form, always rendered empty
pub(crate) fn render_vendor_form() -> String {
    let input = |name: &str, label: &str, placeholder: &str| {
        format!(
            r#"<div>
                <label class='block text-sm text-gray-600 mb-1'>{}</label>
                <input type='text' name='{}' placeholder='{}' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
            </div>"#,
            label, name, placeholder
        )
    };

    format!(
        r#"<form id='vendor-form' hx-post='/vendors' hx-target='#vendor-form' hx-swap='outerHTML' class='space-y-3'>
            {}
            {}
            {}
            <div>
                <label class='block text-sm text-gray-600 mb-1'>口座種別</label>
                <select name='account_type' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
                    <option value='1'>普通</option>
                    <option value='2'>当座</option>
                </select>
            </div>
            {}
            {}
            <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>登録</button>
        </form>"#,
        input("name", "業者名", "株式会社〇〇"),
        input("bank_name", "銀行名", "〇〇銀行"),
        input("branch_name", "支店名", "〇〇支店"),
        input("account_number", "口座番号", "1234567"),
        input("account_holder", "口座名義（カナ）", "カ）〇〇")
    )
}

/// Vendor table with source counts
pub(crate) fn render_vendor_list(session: &Session) -> String {
    let stats = session.directory.stats();

    let mut rows = String::new();
    for vendor in session.directory.vendors() {
        let source = if vendor.is_uploaded() {
            format!(
                "<span class='px-2 py-0.5 rounded text-xs bg-gray-100 text-gray-600' title='{}'>アップロード</span>",
                escape_html(vendor.upload_source.as_deref().unwrap_or(""))
            )
        } else {
            "<span class='px-2 py-0.5 rounded text-xs bg-indigo-50 text-indigo-600'>手動</span>".to_string()
        };
        rows.push_str(&format!(
            r#"<tr class='border-t'>
                <td class='px-4 py-2 font-medium'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 font-mono'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
            </tr>"#,
            escape_html(&vendor.name),
            escape_html(&vendor.bank_summary()),
            vendor.account_type.label(),
            escape_html(&vendor.account_number),
            escape_html(&vendor.account_holder),
            source
        ));
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan='6' class='px-4 py-8 text-center text-gray-500'>登録されている業者がありません</td></tr>");
    }

    format!(
        r#"<div id='vendor-list' class='bg-white rounded-xl shadow-sm overflow-hidden'>
            <div class='flex gap-6 px-4 py-3 border-b bg-gray-50 text-sm text-gray-600'>
                <span>全{}件</span>
                <span>手動登録: {}件</span>
                <span>アップロード: {}件</span>
            </div>
            <table class='w-full text-sm'>
                <thead class='text-gray-600'><tr>
                    <th class='px-4 py-2 text-left'>業者名</th>
                    <th class='px-4 py-2 text-left'>銀行・支店</th>
                    <th class='px-4 py-2 text-left'>種別</th>
                    <th class='px-4 py-2 text-left'>口座番号</th>
                    <th class='px-4 py-2 text-left'>口座名義</th>
                    <th class='px-4 py-2 text-left'>登録元</th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        format_number(stats.total as i64),
        format_number(stats.manual as i64),
        format_number(stats.uploaded as i64),
        rows
    )
}
