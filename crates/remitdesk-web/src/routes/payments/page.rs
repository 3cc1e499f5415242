//! Payment draft page rendering

use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use remitdesk_core::{SearchField, Session};
use remitdesk_utils::{escape_html, format_number};

pub async fn page_payment(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = state.controller.session().await;

    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>支払表作成</h2>
            <p class='text-gray-500 mt-1'>業者ごとの支払項目を追加して支払表を作成します</p>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <section class='bg-white rounded-xl shadow-sm p-6 space-y-4'>
                <h3 class='font-semibold text-gray-700'>基本情報</h3>
                <div>
                    <label class='block text-sm text-gray-600 mb-1'>支払日</label>
                    <input type='date' name='payment_date' value='{}' hx-post='/payments/date' hx-trigger='change' hx-target='#draft-panel' hx-swap='outerHTML' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
                </div>
                {}
            </section>
            <section class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold text-gray-700 mb-4'>支払項目の追加</h3>
                {}
            </section>
        </div>
        {}"#,
        escape_html(&session.header.payment_date),
        render_company_field(&session),
        render_entry_form(&session),
        render_draft_panel(&session)
    );
    let notice = state.notice_html(session.notices.active(), false);

    Html(crate::page_response(&headers, "支払表作成", "/", &inner_content, &notice))
}

/// Company search input, its suggestions and the selected value
pub(crate) fn render_company_field(session: &Session) -> String {
    format!(
        r#"<div id='company-field' class='relative'>
            <label class='block text-sm text-gray-600 mb-1'>送金会社</label>
            <input type='text' name='q' value='{}' placeholder='送金会社名で検索' autocomplete='off' hx-get='/companies/search' hx-trigger='input changed' hx-sync='this:replace' hx-target='#company-suggestions' hx-swap='outerHTML' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
            {}
            {}
        </div>"#,
        escape_html(&session.header.company_query),
        render_company_suggestions(session),
        render_company_selected(session)
    )
}

pub(crate) fn render_company_selected(session: &Session) -> String {
    let company = &session.header.remittance_company;
    if company.is_empty() {
        "<div id='company-selected' class='mt-1 text-sm text-gray-400'>未選択</div>".to_string()
    } else {
        let company = escape_html(company);
        format!(
            "<div id='company-selected' class='mt-1 text-sm text-indigo-600'>選択中: {}<input type='hidden' name='remittance_company' value='{}'></div>",
            company, company
        )
    }
}

pub(crate) fn render_company_suggestions(session: &Session) -> String {
    let panel = &session.company_suggestions;

    if !panel.open {
        return "<div id='company-suggestions' data-suggestions='company' data-open='false'></div>".to_string();
    }

    let mut items = String::new();
    if panel.results.is_empty() {
        items.push_str("<div class='px-3 py-2 text-sm text-gray-500'>該当する送金会社がありません</div>");
    }
    for company in &panel.results {
        let vals = serde_json::json!({ "name": company.name }).to_string();
        items.push_str(&format!(
            r#"<button type='button' class='block w-full text-left px-3 py-2 hover:bg-indigo-50' hx-post='/companies/select' hx-vals='{}' hx-target='#company-field' hx-swap='outerHTML'>
                <div class='font-medium'>{}</div>
                <div class='text-xs text-gray-500'>{}</div>
            </button>"#,
            escape_html(&vals),
            escape_html(&company.name),
            escape_html(&company.bank_summary())
        ));
    }

    format!(
        "<div id='company-suggestions' data-suggestions='company' data-open='true' class='absolute z-10 w-full mt-1 bg-white border border-gray-200 rounded-lg shadow max-h-64 overflow-auto'>{}</div>",
        items
    )
}

/// Vendor search input, its suggestions and the vendor select
pub(crate) fn render_vendor_field(session: &Session) -> String {
    let placeholder = if session.directory.is_loaded() { "業者を選択" } else { "業者データ未読込" };
    let mut options = format!("<option value=''>{}</option>", placeholder);
    for vendor in session.directory.vendors() {
        let selected = if session.entry.vendor_id == Some(vendor.id) { " selected" } else { "" };
        options.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            vendor.id,
            selected,
            escape_html(&vendor.name)
        ));
    }

    format!(
        r#"<div id='vendor-field' class='relative space-y-2'>
            <label class='block text-sm text-gray-600'>業者</label>
            <input type='text' name='q' value='{}' placeholder='業者名・口座番号で検索' autocomplete='off' hx-get='/vendors/search' hx-trigger='input changed' hx-sync='this:replace' hx-target='#vendor-suggestions' hx-swap='outerHTML' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
            {}
            <select name='vendor_id' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>{}</select>
        </div>"#,
        escape_html(&session.entry.vendor_query),
        render_vendor_suggestions(session),
        options
    )
}

pub(crate) fn render_vendor_suggestions(session: &Session) -> String {
    let panel = &session.vendor_suggestions;

    if !panel.open {
        return "<div id='vendor-suggestions' data-suggestions='vendor' data-open='false'></div>".to_string();
    }

    let mut items = String::new();
    if panel.results.is_empty() {
        items.push_str("<div class='px-3 py-2 text-sm text-gray-500'>該当する業者がありません</div>");
    }
    for vendor in &panel.results {
        let vals = serde_json::json!({ "vendor_id": vendor.id.to_string() }).to_string();
        let badge = if vendor.is_uploaded() {
            "<span class='ml-2 text-xs px-1 rounded bg-gray-100 text-gray-500'>アップロード</span>"
        } else {
            ""
        };
        items.push_str(&format!(
            r#"<button type='button' class='block w-full text-left px-3 py-2 hover:bg-indigo-50' hx-post='/vendors/select' hx-vals='{}' hx-target='#vendor-field' hx-swap='outerHTML'>
                <div class='font-medium'>{}{}</div>
                <div class='text-xs text-gray-500'>{} {} {}</div>
            </button>"#,
            escape_html(&vals),
            escape_html(&vendor.name),
            badge,
            escape_html(&vendor.bank_summary()),
            vendor.account_type.label(),
            escape_html(&vendor.account_holder)
        ));
    }

    format!(
        "<div id='vendor-suggestions' data-suggestions='vendor' data-open='true' class='absolute z-10 w-full mt-1 bg-white border border-gray-200 rounded-lg shadow max-h-64 overflow-auto'>{}</div>",
        items
    )
}

pub(crate) fn render_suggestions(session: &Session, field: SearchField) -> String {
    match field {
        SearchField::Vendor => render_vendor_suggestions(session),
        SearchField::Company => render_company_suggestions(session),
    }
}

pub(crate) fn render_entry_form(session: &Session) -> String {
    format!(
        r#"<form id='entry-form' hx-post='/payments/items' hx-target='#entry-form' hx-swap='outerHTML' class='space-y-3'>
            {}
            <div>
                <label class='block text-sm text-gray-600 mb-1'>金額（円）</label>
                <input type='text' name='amount' inputmode='numeric' placeholder='10000' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
            </div>
            <div>
                <label class='block text-sm text-gray-600 mb-1'>摘要</label>
                <input type='text' name='description' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
            </div>
            <div>
                <label class='block text-sm text-gray-600 mb-1'>備考</label>
                <input type='text' name='remarks' class='w-full px-3 py-2 border border-gray-300 rounded-lg'>
            </div>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>追加</button>
        </form>"#,
        render_vendor_field(session)
    )
}

/// Item table, total and the submit / transfer controls
pub(crate) fn render_draft_panel(session: &Session) -> String {
    let mut rows = String::new();
    for item in session.draft.items() {
        rows.push_str(&format!(
            r#"<tr class='border-t'>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 text-right font-mono'>{}円</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 text-gray-500'>{}</td>
                <td class='px-4 py-2 text-right'><button type='button' class='text-red-600 hover:underline' hx-delete='/payments/items/{}' hx-target='#draft-panel' hx-swap='outerHTML'>削除</button></td>
            </tr>"#,
            escape_html(&item.vendor_name),
            format_number(item.amount),
            escape_html(&item.description),
            escape_html(&item.remarks),
            item.id
        ));
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan='5' class='px-4 py-8 text-center text-gray-500'>支払項目がありません</td></tr>");
    }

    let submit_disabled = if session.can_submit() { "" } else { " disabled" };
    let (transfer_disabled, current) = match &session.current_payment {
        Some(current) => {
            let pdf = if current.pdf_generated {
                format!(
                    " <button type='button' class='text-indigo-600 hover:underline' hx-post='/history/{}/pdf' hx-swap='none'>PDF</button>",
                    escape_html(&urlencoding::encode(&current.payment_id))
                )
            } else {
                String::new()
            };
            (
                "",
                format!(
                    "<span class='text-sm text-gray-500'>作成済み: {}{}</span>",
                    escape_html(&current.payment_id),
                    pdf
                ),
            )
        }
        None => (" disabled", String::new()),
    };

    format!(
        r#"<div id='draft-panel' class='bg-white rounded-xl shadow-sm mt-6 overflow-hidden'>
            <table class='w-full text-sm'>
                <thead class='bg-gray-50 text-gray-600'><tr>
                    <th class='px-4 py-2 text-left'>業者名</th>
                    <th class='px-4 py-2 text-right'>金額</th>
                    <th class='px-4 py-2 text-left'>摘要</th>
                    <th class='px-4 py-2 text-left'>備考</th>
                    <th class='px-4 py-2'></th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>
            <div class='flex items-center justify-between px-4 py-3 border-t bg-gray-50'>
                <div class='font-semibold'>合計: <span id='draft-total' class='font-mono'>{}</span>円</div>
                <div class='flex items-center gap-3'>
                    {}
                    <button type='button' class='px-4 py-2 border border-indigo-600 text-indigo-600 rounded-lg disabled:opacity-40' hx-post='/payments/transfer' hx-swap='none'{}>総合振込ファイル</button>
                    <button type='button' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 disabled:opacity-40' hx-post='/payments/submit' hx-target='#draft-panel' hx-swap='outerHTML'{}>支払表を作成</button>
                </div>
            </div>
        </div>"#,
        rows,
        session.draft.total_display(),
        current,
        transfer_disabled,
        submit_disabled
    )
}
