//! Bundled GraphiQL explorer page

use async_graphql::http::GraphiQLSource;
use axum::http::{HeaderMap, header};

const HTML_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];
const JSON_TYPES: &[&str] = &[
    "application/json",
    "application/graphql-response+json",
];

/// Render the explorer page, posting operations back to `endpoint`
pub fn explorer_page(endpoint: &str, title: Option<&str>) -> String {
    let source = GraphiQLSource::build().endpoint(endpoint);
    match title {
        Some(title) => source.title(title).finish(),
        None => source.finish(),
    }
}

/// Whether the `Accept` header ranks HTML above JSON.
///
/// Ties on quality go to whichever media range is listed first. Wildcards do
/// not count for either, so `*/*` (curl's default) gets JSON.
pub fn prefers_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mut html: Option<(f32, usize)> = None;
    let mut json: Option<(f32, usize)> = None;

    for (position, range) in accept.split(',').enumerate() {
        let mut pieces = range.split(';');
        let media = pieces.next().unwrap_or_default().trim().to_ascii_lowercase();
        let quality = pieces
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        let slot = if HTML_TYPES.contains(&media.as_str()) {
            &mut html
        } else if JSON_TYPES.contains(&media.as_str()) {
            &mut json
        } else {
            continue;
        };

        if slot.is_none_or(|(best, _)| quality > best) {
            *slot = Some((quality, position));
        }
    }

    match (html, json) {
        (Some((q_html, _)), _) if q_html <= 0.0 => false,
        (Some(_), None) => true,
        (Some((q_html, p_html)), Some((q_json, p_json))) => {
            q_html > q_json || (q_html == q_json && p_html < p_json)
        }
        (None, _) => false,
    }
}
