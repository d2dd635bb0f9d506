use autoform_core::FormValues;
use leptos::prelude::*;
use std::sync::Arc;

mod api;
mod components;
mod types;

use components::auto_form::AutoForm;

#[component]
pub fn App() -> impl IntoView {
    let schema = LocalResource::new(|| async move { api::get_schema().await });
    let (receipt, set_receipt) = signal(Option::<String>::None);

    let on_submit = Callback::new(move |values: FormValues| {
        wasm_bindgen_futures::spawn_local(async move {
            match api::submit_form(&values).await {
                Ok(r) => {
                    log::info!("Submission {} accepted with {} field(s)", r.id, r.field_count);
                    set_receipt.set(Some(format!(
                        "Submission {} received at {} ({} fields)",
                        r.id, r.received_at, r.field_count
                    )));
                }
                Err(e) => {
                    web_sys::window()
                        .and_then(|w| w.alert_with_message(&format!("Failed to submit: {}", e)).ok());
                }
            }
        });
    });

    view! {
        <div class="page">
            <h1>"AutoForm"</h1>
            <Suspense fallback=move || view! { <div class="muted">"Loading form..."</div> }>
                {move || {
                    schema.get().map(|result| match result {
                        Ok(schema) => view! {
                            <AutoForm schema=Arc::new(schema) on_submit=on_submit />
                        }.into_any(),
                        Err(e) => view! {
                            <div class="field-error">{format!("Failed to load form: {}", e)}</div>
                        }.into_any(),
                    })
                }}
            </Suspense>
            {move || receipt.get().map(|text| view! { <div class="receipt">{text}</div> })}
        </div>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    // Resolver events reach the browser console through the `log` facade
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(App);
}
