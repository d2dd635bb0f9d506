//! Schema-driven form with dependent option lists
//!
//! The [`OptionResolver`] lives in a signal. Every value change goes through
//! [`set_field`], which applies it to the resolver and dispatches the fetch
//! tickets it hands back; each response is written back with
//! `OptionResolver::complete`, which drops responses overtaken by a newer
//! request for the same field.

pub mod fields;

use autoform_core::{FetchTicket, FieldDescriptor, FormSchema, FormValues, OptionResolver, RequiredViolation};
use leptos::prelude::*;
use serde_json::Value;
use std::sync::Arc;

use crate::api;
use fields::FieldControl;

/// Fetch each ticket and feed the result back into the resolver
pub fn dispatch(resolver: RwSignal<OptionResolver>, tickets: Vec<FetchTicket>) {
    for ticket in tickets {
        wasm_bindgen_futures::spawn_local(async move {
            let result = api::fetch_options(&ticket.url).await;
            resolver.update(|r| {
                r.complete(&ticket, result);
            });
        });
    }
}

/// Apply a value change and start the fetches it triggers
pub fn set_field(resolver: RwSignal<OptionResolver>, name: &str, value: Value) {
    match resolver.try_update(|r| r.set_value(name, value)) {
        Some(Ok(tickets)) => dispatch(resolver, tickets),
        Some(Err(e)) => log::warn!("{}", e),
        None => {}
    }
}

/// Inline style placing a field on the 24-column grid
pub fn grid_span(col_span: u8) -> String {
    format!("grid-column: span {} / span {};", col_span, col_span)
}

/// Renders every field of `schema` and hands the values to `on_submit`
/// once all `required` rules hold.
#[component]
pub fn AutoForm(
    schema: Arc<FormSchema>,
    #[prop(into)] on_submit: Callback<FormValues>,
) -> impl IntoView {
    let resolver = RwSignal::new(OptionResolver::new(schema.clone()));
    let violations = RwSignal::new(Vec::<RequiredViolation>::new());

    if let Some(tickets) = resolver.try_update(|r| r.mount()) {
        dispatch(resolver, tickets);
    }

    let on_form_submit = {
        let schema = schema.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let values = resolver.with_untracked(|r| r.values().clone());
            let missing = schema.missing_required(&values);
            if missing.is_empty() {
                violations.set(Vec::new());
                on_submit.run(values);
            } else {
                log::info!("Submission blocked: {} required field(s) missing", missing.len());
                violations.set(missing);
            }
        }
    };

    let on_show_data = move |_| {
        let values = resolver.with_untracked(|r| r.values().clone());
        match serde_json::to_string_pretty(&values) {
            Ok(json) => log::info!("Form values: {}", json),
            Err(e) => log::warn!("Failed to serialize form values: {}", e),
        }
    };

    let fields: Vec<FieldDescriptor> = schema.fields().to_vec();

    view! {
        <form class="autoform" on:submit=on_form_submit>
            <div class="autoform-grid">
                {fields.into_iter().map(|field| {
                    let name = field.name.clone();
                    let error = Signal::derive(move || {
                        violations.with(|v| {
                            v.iter().find(|violation| violation.field == name).map(|violation| violation.message.clone())
                        })
                    });
                    view! {
                        <FieldRow field=field resolver=resolver error=error />
                    }
                }).collect_view()}
            </div>
            <div class="autoform-actions">
                <button type="submit" class="btn-primary">"Submit"</button>
                <button type="button" class="btn-secondary" on:click=on_show_data>"Show Data"</button>
            </div>
        </form>
    }
}

/// Label, control and validation message of one field
#[component]
fn FieldRow(
    field: FieldDescriptor,
    resolver: RwSignal<OptionResolver>,
    error: Signal<Option<String>>,
) -> impl IntoView {
    let style = grid_span(field.col_span);
    let required = field.is_required();
    let label = field.label.clone();
    let input_id = format!("field-{}", field.name);

    view! {
        <div class="autoform-field" style=style>
            <label for=input_id.clone()>
                {label}
                {required.then(|| view! { <span class="required">"*"</span> })}
            </label>
            <FieldControl field=field resolver=resolver input_id=input_id />
            {move || error.get().map(|message| view! { <p class="field-error">{message}</p> })}
        </div>
    }
}
