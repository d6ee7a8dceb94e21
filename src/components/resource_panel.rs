//! Resource Panel Component
//!
//! Admin page for one collection: the shared add/edit form on top, the
//! current records below. Every field is rendered from the schema.

use leptos::prelude::*;
use tastebook_core::{list_header, project, Audience, CardSource, FieldKind, RecordId};

use super::{CardActions, CardGrid, FormField, ImageField, NoticeBanner};
use crate::store::{scroll_to_form_on_edit, ManagerStore};

#[component]
pub fn ResourcePanel<R>(store: ManagerStore<R>) -> impl IntoView
where
    R: CardSource,
{
    let schema = R::schema();
    let form_id = format!("{}-form", schema.table);
    scroll_to_form_on_edit(store, form_id.clone());

    let editing = Memo::new(move |_| store.snapshot.with(|s| s.form.editing));
    let can_submit = Memo::new(move |_| store.snapshot.with(|s| s.form.can_submit()));
    let count = Memo::new(move |_| store.snapshot.with(|s| s.records.len()));
    let notice = Signal::derive(move || store.snapshot.with(|s| s.form.notice.clone()));
    let list = Signal::derive(move || {
        store
            .snapshot
            .with(|s| project(&s.records, s.loading, Audience::Admin))
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        store.spawn(|manager| async move {
            let _ = manager.submit().await;
        });
    };

    let actions = CardActions {
        schema,
        editing: Signal::derive(move || editing.get().id()),
        pending_removal: Signal::derive(move || store.snapshot.with(|s| s.pending_removal)),
        on_edit: Callback::new(move |id: RecordId| {
            let record = store.snapshot.with_untracked(|s| s.find(id).cloned());
            if let Some(record) = record {
                let _ = store.manager().begin_edit(&record);
            }
        }),
        on_request_delete: Callback::new(move |id: RecordId| store.manager().request_remove(id)),
        on_confirm_delete: Callback::new(move |_| {
            store.spawn(|manager| async move {
                let _ = manager.confirm_remove().await;
            });
        }),
        on_dismiss_delete: Callback::new(move |_| store.manager().dismiss_remove()),
    };

    let fields = schema
        .fields
        .iter()
        .map(|field| match field.kind {
            FieldKind::ImageUrl => view! { <ImageField store=store field=field /> }.into_any(),
            _ => view! {
                <FormField
                    field=field
                    value=Signal::derive(move || {
                        store.snapshot.with(|s| s.form.draft.get(field.name).to_string())
                    })
                    on_input=Callback::new(move |value: String| {
                        store.manager().set_field(field.name, value);
                    })
                />
            }
            .into_any(),
        })
        .collect_view();

    let verb = move || if editing.get().is_existing() { "Update" } else { "Add" };

    view! {
        <section class="resource-panel">
            <h2>
                {move || {
                    if editing.get().is_existing() {
                        format!("Edit {}", schema.title)
                    } else {
                        format!("Add New {}", schema.title)
                    }
                }}
            </h2>
            <NoticeBanner notice=notice />
            <form id=form_id class="resource-form" on:submit=on_submit>
                {fields}
                <div class="form-actions">
                    <button type="submit" class="btn-primary" disabled=move || !can_submit.get()>
                        {move || format!("{} {}", verb(), schema.title)}
                    </button>
                    <Show when=move || editing.get().is_existing()>
                        <button
                            type="button"
                            class="cancel-btn"
                            on:click=move |_| store.manager().cancel()
                        >
                            "Cancel"
                        </button>
                    </Show>
                </div>
            </form>
            <h3 class="list-header">{move || list_header(schema, count.get())}</h3>
            <CardGrid list=list actions=Some(actions) />
        </section>
    }
}
