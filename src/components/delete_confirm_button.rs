//! Delete Confirm Button Component
//!
//! Inline two-step delete: the first click only asks, the record is removed
//! after the user confirms.

use leptos::prelude::*;

/// Inline delete confirmation button
///
/// # Arguments
/// * `prompt` - Question shown while confirmation is pending
/// * `pending` - Whether this record is the one awaiting confirmation
/// * `on_request` - First click; marks the record as pending
/// * `on_confirm` - Deletes the pending record
/// * `on_dismiss` - Backs out without deleting
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] prompt: String,
    #[prop(into)] pending: Signal<bool>,
    #[prop(into)] on_request: Callback<()>,
    #[prop(into)] on_confirm: Callback<()>,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || !pending.get()>
            <button
                class="delete-btn"
                on:click=move |ev| {
                    ev.stop_propagation();
                    on_request.run(());
                }
            >
                "Delete"
            </button>
        </Show>
        <Show when=move || pending.get()>
            <span class="delete-confirm">
                <span class="delete-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        on_confirm.run(());
                    }
                >
                    "Delete"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        on_dismiss.run(());
                    }
                >
                    "Keep"
                </button>
            </span>
        </Show>
    }
}
