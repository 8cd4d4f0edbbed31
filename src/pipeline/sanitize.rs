//! Isolate a JSON fragment from model output.
//!
//! Models wrap JSON in markdown fences or prose despite being told not to.

/// Strip code fences and surrounding text, returning the span from the
/// first `{`/`[` to the last `}`/`]`.
///
/// Without a bracket pair the trimmed, de-fenced input comes back as is,
/// and decoding it fails downstream.
pub fn sanitize(raw: &str) -> String {
    let text = strip_fences(raw);

    let Some(start) = text.find(['{', '[']) else {
        return text.to_string();
    };

    match text.rfind(['}', ']']) {
        Some(end) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let stripped = text
            .strip_prefix("```json")
            .or_else(|| text.strip_prefix("```"))
            .unwrap_or(text);
        let stripped = stripped.strip_suffix("```").unwrap_or(stripped).trim();
        if stripped.len() == text.len() {
            return text;
        }
        text = stripped;
    }
}
