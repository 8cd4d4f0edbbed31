//! Body extraction from a MIME part tree.
//!
//! Pure string work, no I/O. Plain text anywhere in the tree beats HTML;
//! HTML is returned as raw markup.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

use crate::mailbox::types::MimePart;

/// Extract the best plain-text body from a MIME tree.
///
/// Returns an empty string when the tree carries no decodable text;
/// callers fall back to the message snippet.
pub fn extract_body(part: &MimePart) -> String {
    find_plain(part)
        .or_else(|| find_html(part))
        .unwrap_or_default()
}

/// Depth-first search for `text/plain`, checking a part's immediate
/// children before descending.
fn find_plain(part: &MimePart) -> Option<String> {
    if part.is_mime("text/plain") {
        return decoded_text(part);
    }

    if let Some(text) = part
        .parts
        .iter()
        .filter(|child| child.is_mime("text/plain"))
        .find_map(decoded_text)
    {
        return Some(text);
    }

    part.parts.iter().find_map(find_plain)
}

fn find_html(part: &MimePart) -> Option<String> {
    if part.is_mime("text/html") {
        return decoded_text(part);
    }
    part.parts.iter().find_map(find_html)
}

/// Decode a leaf's base64url data. Empty or undecodable data is `None`.
fn decoded_text(part: &MimePart) -> Option<String> {
    let data = part.data()?.trim();
    let bytes = URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')))
        .ok()?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    (!text.is_empty()).then_some(text)
}
