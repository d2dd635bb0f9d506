//! Field Renderers
//!
//! One control per field kind. Controls read their value, options and flags
//! from the shared resolver signal and write changes through `set_field`.

use autoform_core::{FieldDescriptor, FieldKind, FieldOption, OptionResolver, SelectField};
use leptos::prelude::*;
use leptos::web_sys;
use serde_json::{Number, Value};

use super::set_field;

// ============================================================================
// Value Helpers
// ============================================================================

/// Text shown in an input for a stored value
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Map a `<select>` value back to the option it came from, so numeric
/// option values stay numbers in the form values
pub fn select_value(raw: &str, options: &[FieldOption]) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    options
        .iter()
        .find(|o| o.value.to_string() == raw)
        .map(|o| o.value.to_json())
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Options whose label contains `query`; the selected option always stays
pub fn filter_options(options: &[FieldOption], query: &str, selected: Option<&Value>) -> Vec<FieldOption> {
    let query = query.trim();
    options
        .iter()
        .filter(|o| query.is_empty() || o.label_contains(query) || selected.is_some_and(|v| o.value.matches(v)))
        .cloned()
        .collect()
}

pub fn parse_number(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub fn char_count(text: &str, max_length: u32) -> String {
    format!("{} / {}", text.chars().count(), max_length)
}

fn file_names(input: &web_sys::HtmlInputElement) -> Value {
    let names = input
        .files()
        .map(|files| {
            (0..files.length())
                .filter_map(|i| files.get(i))
                .map(|file| Value::String(file.name()))
                .collect()
        })
        .unwrap_or_default();
    Value::Array(names)
}

// ============================================================================
// Field Control
// ============================================================================

/// Renders the control matching the field's kind
#[component]
pub fn FieldControl(
    field: FieldDescriptor,
    resolver: RwSignal<OptionResolver>,
    input_id: String,
) -> impl IntoView {
    let name = field.name;

    match field.kind {
        FieldKind::Input { placeholder } => view! {
            <TextInput name=name resolver=resolver input_id=input_id placeholder=placeholder list=None />
        }.into_any(),
        FieldKind::Select(select) => view! {
            <SelectControl name=name select=select resolver=resolver input_id=input_id />
        }.into_any(),
        FieldKind::AutoComplete { suggestions, placeholder } => {
            let list_id = format!("{}-suggestions", input_id);
            view! {
                <TextInput name=name resolver=resolver input_id=input_id placeholder=placeholder list=Some(list_id.clone()) />
                <datalist id=list_id>
                    {suggestions.into_iter().map(|s| view! { <option value=s></option> }).collect_view()}
                </datalist>
            }.into_any()
        }
        FieldKind::Number { prefix, suffix } => view! {
            <NumberControl name=name resolver=resolver input_id=input_id prefix=prefix suffix=suffix />
        }.into_any(),
        FieldKind::Checkbox => view! {
            <CheckboxControl name=name resolver=resolver input_id=input_id />
        }.into_any(),
        FieldKind::TextArea { placeholder, max_length } => view! {
            <TextAreaControl name=name resolver=resolver input_id=input_id placeholder=placeholder max_length=max_length />
        }.into_any(),
        FieldKind::Upload { action } => view! {
            <FileControl name=name resolver=resolver input_id=input_id action=action multiple=false dragger=false />
        }.into_any(),
        FieldKind::Dragger { action, multiple } => view! {
            <FileControl name=name resolver=resolver input_id=input_id action=action multiple=multiple dragger=true />
        }.into_any(),
    }
}

// ============================================================================
// Text Inputs
// ============================================================================

#[component]
fn TextInput(
    name: String,
    resolver: RwSignal<OptionResolver>,
    input_id: String,
    placeholder: Option<String>,
    list: Option<String>,
) -> impl IntoView {
    let name_for_change = name.clone();

    view! {
        <input
            type="text"
            id=input_id
            class="input"
            list=list
            placeholder=placeholder.unwrap_or_default()
            prop:value=move || resolver.with(|r| display_value(r.value(&name)))
            on:input=move |ev| {
                set_field(resolver, &name_for_change, Value::String(event_target_value(&ev)));
            }
        />
    }
}

#[component]
fn TextAreaControl(
    name: String,
    resolver: RwSignal<OptionResolver>,
    input_id: String,
    placeholder: Option<String>,
    max_length: u32,
) -> impl IntoView {
    let name_for_change = name.clone();
    let name_for_count = name.clone();

    view! {
        <textarea
            id=input_id
            class="input"
            rows="4"
            maxlength=max_length.to_string()
            placeholder=placeholder.unwrap_or_default()
            prop:value=move || resolver.with(|r| display_value(r.value(&name)))
            on:input=move |ev| {
                set_field(resolver, &name_for_change, Value::String(event_target_value(&ev)));
            }
        ></textarea>
        <div class="char-count">
            {move || resolver.with(|r| char_count(&display_value(r.value(&name_for_count)), max_length))}
        </div>
    }
}

#[component]
fn NumberControl(
    name: String,
    resolver: RwSignal<OptionResolver>,
    input_id: String,
    prefix: Option<String>,
    suffix: Option<String>,
) -> impl IntoView {
    let name_for_change = name.clone();

    view! {
        <div class="number-input">
            {prefix.map(|p| view! { <span class="affix">{p}</span> })}
            <input
                type="number"
                step="any"
                id=input_id
                class="input"
                prop:value=move || resolver.with(|r| display_value(r.value(&name)))
                on:input=move |ev| {
                    set_field(resolver, &name_for_change, parse_number(&event_target_value(&ev)));
                }
            />
            {suffix.map(|s| view! { <span class="affix">{s}</span> })}
        </div>
    }
}

#[component]
fn CheckboxControl(name: String, resolver: RwSignal<OptionResolver>, input_id: String) -> impl IntoView {
    let name_for_change = name.clone();

    view! {
        <input
            type="checkbox"
            id=input_id
            prop:checked=move || resolver.with(|r| r.value(&name).and_then(Value::as_bool).unwrap_or(false))
            on:change=move |ev| {
                set_field(resolver, &name_for_change, Value::Bool(event_target_checked(&ev)));
            }
        />
    }
}

// ============================================================================
// Select
// ============================================================================

/// Select with a search box, a loading hint and a `-- None --` entry.
/// Disabled while the field it depends on has no value.
#[component]
fn SelectControl(
    name: String,
    select: SelectField,
    resolver: RwSignal<OptionResolver>,
    input_id: String,
) -> impl IntoView {
    let query = RwSignal::new(String::new());
    let search_placeholder = select.placeholder.unwrap_or_else(|| "Search...".to_string());

    let name_for_disabled = name.clone();
    let name_for_loading = name.clone();
    let name_for_options = name.clone();
    let name_for_change = name.clone();

    let is_disabled = move || resolver.with(|r| r.is_disabled(&name_for_disabled));

    view! {
        <div class="select-control">
            <input
                type="search"
                class="input select-search"
                placeholder=search_placeholder
                disabled=is_disabled.clone()
                prop:value=move || query.get()
                on:input=move |ev| query.set(event_target_value(&ev))
            />
            <select
                id=input_id
                class="input"
                disabled=is_disabled
                on:change=move |ev| {
                    let raw = event_target_value(&ev);
                    let value = resolver.with_untracked(|r| select_value(&raw, r.options(&name_for_change)));
                    set_field(resolver, &name_for_change, value);
                }
            >
                <option value="" prop:selected=move || resolver.with(|r| r.value(&name).is_none())>
                    "-- None --"
                </option>
                {move || {
                    let q = query.get();
                    resolver.with(|r| {
                        let selected = r.value(&name_for_options);
                        filter_options(r.options(&name_for_options), &q, selected)
                            .into_iter()
                            .map(|option| {
                                let is_selected = selected.is_some_and(|v| option.value.matches(v));
                                view! {
                                    <option value=option.value.to_string() prop:selected=is_selected>
                                        {option.label}
                                    </option>
                                }
                            })
                            .collect_view()
                    })
                }}
            </select>
            {move || {
                resolver
                    .with(|r| r.is_loading(&name_for_loading))
                    .then(|| view! { <span class="loading-hint">"Loading..."</span> })
            }}
        </div>
    }
}

// ============================================================================
// Files
// ============================================================================

/// File picker recording the selected file names; uploading to `action`
/// is left to the host page
#[component]
fn FileControl(
    name: String,
    resolver: RwSignal<OptionResolver>,
    input_id: String,
    action: String,
    multiple: bool,
    dragger: bool,
) -> impl IntoView {
    let name_for_change = name.clone();
    let class = if dragger { "file-control dragger" } else { "file-control" };

    view! {
        <div class=class data-action=action>
            {dragger.then(|| view! { <p class="dragger-hint">"Click or drag files to this area"</p> })}
            <input
                type="file"
                id=input_id
                multiple=multiple
                on:change=move |ev| {
                    let input: web_sys::HtmlInputElement = event_target(&ev);
                    set_field(resolver, &name_for_change, file_names(&input));
                }
            />
            <ul class="file-list">
                {move || {
                    resolver.with(|r| {
                        r.value(&name)
                            .and_then(Value::as_array)
                            .map(|files| {
                                files
                                    .iter()
                                    .filter_map(Value::as_str)
                                    .map(|f| view! { <li>{f.to_string()}</li> })
                                    .collect_view()
                            })
                    })
                }}
            </ul>
        </div>
    }
}
