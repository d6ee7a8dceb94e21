//! Card Grid Component
//!
//! Renders a projected list: placeholder, empty state or one card per record.
//! Admin lists pass [`CardActions`] to get edit and delete controls.

use leptos::prelude::*;
use tastebook_core::{Card, ListView, RecordId, Schema};

use super::DeleteConfirmButton;
use crate::markdown::render_markdown;

/// Admin controls attached to every card
#[derive(Clone, Copy)]
pub struct CardActions {
    pub schema: &'static Schema,
    /// Record currently loaded in the form
    pub editing: Signal<Option<RecordId>>,
    pub pending_removal: Signal<Option<RecordId>>,
    pub on_edit: Callback<RecordId>,
    pub on_request_delete: Callback<RecordId>,
    pub on_confirm_delete: Callback<()>,
    pub on_dismiss_delete: Callback<()>,
}

#[component]
pub fn CardGrid(#[prop(into)] list: Signal<ListView>, actions: Option<CardActions>) -> impl IntoView {
    move || match list.get() {
        ListView::Loading(text) => view! { <p class="list-placeholder">{text}</p> }.into_any(),
        ListView::Empty(text) => view! { <p class="list-empty">{text}</p> }.into_any(),
        ListView::Cards(cards) => view! {
            <div class="card-grid">
                {cards
                    .into_iter()
                    .map(|card| view! { <CardView card=card actions=actions /> })
                    .collect_view()}
            </div>
        }
        .into_any(),
    }
}

#[component]
fn CardView(card: Card, actions: Option<CardActions>) -> impl IntoView {
    let Card {
        id,
        heading,
        badge,
        body,
        image_url,
        meta,
        detail,
        editable,
    } = card;
    let alt = heading.clone();
    let detail_html = detail.map(|markdown| render_markdown(&markdown));
    let actions = actions.filter(|_| editable);

    let class = move || match actions {
        Some(actions) if actions.editing.get() == Some(id) => "card card-editing",
        _ => "card",
    };

    let controls = actions.map(|actions| {
        view! {
            <div class="card-actions">
                <button class="edit-btn" on:click=move |_| actions.on_edit.run(id)>
                    "Edit"
                </button>
                <DeleteConfirmButton
                    prompt=actions.schema.delete_prompt()
                    pending=Signal::derive(move || actions.pending_removal.get() == Some(id))
                    on_request=Callback::new(move |_| actions.on_request_delete.run(id))
                    on_confirm=actions.on_confirm_delete
                    on_dismiss=actions.on_dismiss_delete
                />
            </div>
        }
    });

    view! {
        <article class=class>
            {image_url.map(|src| view! { <img class="card-image" src=src alt=alt /> })}
            <div class="card-body">
                {badge.map(|badge| view! { <span class="card-badge">{badge}</span> })}
                <h3 class="card-heading">{heading}</h3>
                <p class="card-text">{body}</p>
                <div class="card-meta">
                    {meta.into_iter().map(|item| view! { <span>{item}</span> }).collect_view()}
                </div>
                {detail_html.map(|html| view! { <div class="card-detail" inner_html=html></div> })}
                {controls}
            </div>
        </article>
    }
}
