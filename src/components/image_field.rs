//! Image Field Component
//!
//! File picker for a record's image. The file is checked for size as soon as
//! it is picked and holds the upload slot while its bytes are read, so the
//! form can't be submitted half way. Its public URL lands in the draft;
//! nothing is saved until the form is submitted.

use gloo_file::futures::read_as_bytes;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use tastebook_core::{Entity, FieldSpec, SelectedFile};
use wasm_bindgen::JsCast;

use crate::store::ManagerStore;

const MIB: u64 = 1024 * 1024;

#[component]
pub fn ImageField<R>(store: ManagerStore<R>, field: &'static FieldSpec) -> impl IntoView
where
    R: Entity,
{
    let url = Memo::new(move |_| {
        store
            .snapshot
            .with(|s| s.form.draft.get(field.name).to_string())
    });
    let uploading = Memo::new(move |_| store.snapshot.with(|s| s.form.upload.is_uploading()));
    let hint = format!(
        "Images up to {}MB",
        store.manager().settings().max_upload_bytes / MIB
    );

    let on_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(picked) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        // Let the same file be picked again after a failure.
        input.set_value("");

        let file = gloo_file::File::from(picked);
        let manager = store.manager();
        let Ok(ticket) = manager.select_image(&file.name(), file.size()) else {
            return;
        };
        spawn_local(async move {
            match read_as_bytes(&file).await {
                Ok(bytes) => {
                    let content_type = Some(file.raw_mime_type()).filter(|t| !t.is_empty());
                    let selected = SelectedFile::new(file.name(), content_type, bytes);
                    let _ = manager.upload_selected(ticket, selected).await;
                }
                Err(err) => {
                    warn!("could not read {}: {}", file.name(), err);
                    manager.abandon_upload(ticket, &err.to_string());
                }
            }
        });
    };

    view! {
        <div class="form-field image-field">
            <label>{field.label}</label>
            <input
                type="file"
                accept="image/*"
                disabled=move || uploading.get()
                on:change=on_change
            />
            <small class="field-hint">{hint}</small>
            <Show when=move || uploading.get()>
                <p class="upload-status">"Uploading image..."</p>
            </Show>
            <Show when=move || !url.get().is_empty()>
                <img class="image-preview" src=move || url.get() alt="Preview" />
            </Show>
        </div>
    }
}
