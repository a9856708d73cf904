//! `data:` URL payloads carried by `file` operations.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^data:([^;,]*)((?:;[^;,]+)*);base64,([A-Za-z0-9+/=\s]*)$")
            .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

/// Decode a base64 data URL. Returns a human readable reason on failure.
pub fn parse_data_url(url: &str) -> Result<DataUrl, String> {
    let caps = data_url_pattern()
        .captures(url)
        .ok_or_else(|| "expected data:<mime>;base64,<payload>".to_string())?;
    let mime_type = match caps.get(1).map(|m| m.as_str()) {
        Some("") | None => "text/plain".to_string(),
        Some(mime) => mime.to_ascii_lowercase(),
    };
    let payload: String = caps
        .get(3)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default();
    let bytes = STANDARD.decode(payload).map_err(|e| format!("invalid base64 payload: {e}"))?;
    Ok(DataUrl { mime_type, bytes })
}

/// Encode bytes as a base64 data URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}
