//! Form Field Component
//!
//! One labelled input, chosen by the field's kind.

use leptos::prelude::*;
use tastebook_core::{FieldKind, FieldSpec};

#[component]
pub fn FormField(
    field: &'static FieldSpec,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
) -> impl IntoView {
    let id = format!("field-{}", field.name);
    let label = if field.required {
        format!("{} *", field.label)
    } else {
        field.label.to_string()
    };

    let control = match field.kind {
        FieldKind::LongText => view! {
            <textarea
                id=id.clone()
                rows="4"
                placeholder=field.placeholder
                required=field.required
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
        }
        .into_any(),
        kind => {
            let input_type = match kind {
                FieldKind::Integer => "number",
                FieldKind::Date => "date",
                _ => "text",
            };
            view! {
                <input
                    type=input_type
                    id=id.clone()
                    placeholder=field.placeholder
                    required=field.required
                    maxlength=field.max_chars.map(|max| max.to_string())
                    prop:value=move || value.get()
                    on:input=move |ev| on_input.run(event_target_value(&ev))
                />
            }
            .into_any()
        }
    };

    view! {
        <div class="form-field">
            <label for=id>{label}</label>
            {control}
        </div>
    }
}
