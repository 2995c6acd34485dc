//! Text-safe transport encoding for binary payloads (compiled artifacts, narration audio).
//!
//! Payloads are stored as standard base64, optionally behind a data-URI scheme marker
//! (`data:<mime>;base64,`). The marker is stripped before decoding.

use base64::Engine as _;

use crate::foundation::error::{PanelError, PanelResult};

/// Mime type used for compiled target artifacts.
pub const ARTIFACT_MIME: &str = "application/octet-stream";

/// Encode `bytes` as `data:<mime>;base64,<payload>`.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

/// Encode a compiled artifact in its persisted form.
pub fn encode_artifact(bytes: &[u8]) -> String {
    encode_data_uri(ARTIFACT_MIME, bytes)
}

/// Return the base64 payload of `text`, dropping any data-URI scheme marker.
pub fn strip_scheme_prefix(text: &str) -> &str {
    let text = text.trim();
    if let Some((_, payload)) = text.split_once("base64,") {
        return payload;
    }
    if text.starts_with("data:")
        && let Some((_, payload)) = text.split_once(',')
    {
        return payload;
    }
    text
}

/// Decode a transport string (bare base64 or data URI) back to bytes, bit-exactly.
pub fn decode_text(text: &str) -> PanelResult<Vec<u8>> {
    let payload = strip_scheme_prefix(text);
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| PanelError::artifact_decode(format!("invalid base64 payload: {e}")))
}

/// Mime type declared by a data URI, if any.
pub fn data_uri_mime(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("data:")?;
    let (meta, _) = rest.split_once(',')?;
    let mime = meta.split(';').next().unwrap_or_default();
    (!mime.is_empty()).then_some(mime)
}

pub fn is_data_uri(text: &str) -> bool {
    text.trim_start().starts_with("data:")
}

/// Short form of a source reference for logs and errors; data URIs can be megabytes long.
pub fn describe_source(source: &str) -> String {
    if is_data_uri(source) {
        let mime = data_uri_mime(source).unwrap_or("unknown");
        return format!("data:{mime} ({} chars)", source.len());
    }
    source.to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/transport.rs"]
mod tests;
