use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Trunk output of the `autoform-ui` crate
#[derive(RustEmbed)]
#[folder = "ui/dist"]
#[allow_missing = true]
struct UiAssets;

const INDEX: &str = "index.html";

pub struct UIHandler;

impl UIHandler {
    /// Serve an embedded asset, falling back to the SPA entry point
    pub async fn serve(uri: Uri) -> Response {
        let path = match uri.path().trim_start_matches('/') {
            "" => INDEX,
            path => path,
        };

        asset(path)
            .or_else(|| asset(INDEX))
            .unwrap_or_else(|| {
                (
                    StatusCode::NOT_FOUND,
                    "UI not built: run `trunk build --release` in ui/",
                )
                    .into_response()
            })
    }
}

fn asset(path: &str) -> Option<Response> {
    UiAssets::get(path).map(|content| {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        ([(header::CONTENT_TYPE, mime.as_ref().to_string())], content.data).into_response()
    })
}
