//! Helpers shared by the reqwest-backed adapters.

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Single-line, length-capped rendering of a response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// `status N` or `status N: <preview>` when the body is not empty.
pub(crate) fn status_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}
