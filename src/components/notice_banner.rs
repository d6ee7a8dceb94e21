//! Notice Banner Component

use leptos::prelude::*;
use tastebook_core::Notice;

/// Transient success/error message above a form
#[component]
pub fn NoticeBanner(#[prop(into)] notice: Signal<Option<Notice>>) -> impl IntoView {
    move || {
        notice.get().map(|notice| {
            let class = if notice.is_error() {
                "notice notice-error"
            } else {
                "notice notice-success"
            };
            view! { <div class=class role="status">{notice.message}</div> }
        })
    }
}
