use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates/"]
pub struct Pages;

const VIDEO_PATH_PLACEHOLDER: &str = "{{ video_path }}";

pub async fn index_handler() -> impl IntoResponse {
    serve_page("index.html").unwrap_or_else(|status| {
        Response::builder()
            .status(status)
            .body(Body::from("Upload page is missing from the build."))
            .unwrap()
    })
}

/// Results page pointing at an annotated video under the static root.
pub fn render_results(video_path: &str) -> Result<String, StatusCode> {
    let page = Pages::get("results.html").ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let template =
        std::str::from_utf8(&page.data).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(template.replace(VIDEO_PATH_PLACEHOLDER, &escape_html(video_path)))
}

fn serve_page(path: &str) -> Result<Response<Body>, StatusCode> {
    if let Some(asset) = Pages::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        Response::builder()
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_str(mime.as_ref())
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
            )
            .body(Body::from(asset.data.into_owned()))
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
