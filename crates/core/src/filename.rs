//! Upload filename recovery.
//!
//! Multipart transports are not reliable carriers of non-ASCII filenames.
//! Two recovery mechanisms exist, in order of preference:
//!
//! 1. A cooperating client sends the exact name base64-encoded in a query
//!    parameter alongside the upload. This side channel is lossless.
//! 2. Failing that, the transport-provided name is assumed to have been
//!    round-tripped byte-for-byte through a Latin-1 reinterpretation of a
//!    GBK-encoded original, and is re-decoded accordingly. This is a
//!    heuristic: names that were genuinely UTF-8 or another encoding will be
//!    mis-decoded.
//!
//! Neither path is ever fatal. Worst case the stored filename is wrong but
//! the upload still succeeds.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Resolve the display filename for an upload.
///
/// `transport_name` is the filename as it arrived in the multipart form.
/// `encoded_override` is the optional base64 side-channel value from the
/// query string; when present and decodable it wins verbatim.
pub fn resolve_upload_filename(transport_name: &str, encoded_override: Option<&str>) -> String {
    if let Some(encoded) = encoded_override {
        match BASE64.decode(encoded) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(name) if !name.trim().is_empty() => return name,
                _ => {
                    tracing::warn!(
                        encoded,
                        "base64 filename is not valid UTF-8, falling back to transport name"
                    );
                }
            },
            Err(err) => {
                tracing::warn!(
                    encoded,
                    %err,
                    "base64 filename decode failed, falling back to transport name"
                );
            }
        }
        return transport_name.to_string();
    }

    recover_gbk(transport_name).unwrap_or_else(|| transport_name.to_string())
}

/// Reinterpret a mangled transport name's chars as Latin-1 bytes and decode
/// them as GBK. Returns `None` when the name cannot have gone through a
/// Latin-1 round trip (contains code points above U+00FF) or the bytes are
/// not valid GBK.
fn recover_gbk(name: &str) -> Option<String> {
    // ASCII survives any single-byte reinterpretation untouched.
    if name.is_ascii() {
        return None;
    }

    let mut bytes = Vec::with_capacity(name.len());
    for c in name.chars() {
        let cp = c as u32;
        if cp > 0xFF {
            return None;
        }
        bytes.push(cp as u8);
    }

    let (decoded, _, had_errors) = encoding_rs::GBK.decode(&bytes);
    if had_errors {
        tracing::warn!(name, "filename did not re-decode as GBK, keeping transport name");
        return None;
    }
    Some(decoded.into_owned())
}
