//! Envelope-sender extraction into caller-owned buffers.

use std::borrow::Cow;

/// Copy `src` into `dst`, truncating to fit and NUL-terminating.
///
/// At most `dst.len() - 1` bytes are copied, followed by a single `0`
/// byte. An empty `dst` is left untouched. Truncation is silent.
///
/// Returns the number of content bytes written (the terminator excluded).
pub fn copy_bounded(src: &[u8], dst: &mut [u8]) -> usize {
    let Some(room) = dst.len().checked_sub(1) else {
        return 0;
    };
    let n = room.min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    dst[n] = 0;
    n
}

/// Content bytes of a NUL-terminated buffer filled by [`copy_bounded`].
pub fn terminated(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}

/// Drop an incomplete UTF-8 sequence left at the end of truncated bytes.
///
/// Only a trailing partial character is removed. Bytes that are invalid
/// UTF-8 anywhere else are returned unchanged.
pub fn trim_partial_utf8(bytes: &[u8]) -> &[u8] {
    match std::str::from_utf8(bytes) {
        Err(e) if e.error_len().is_none() => &bytes[..e.valid_up_to()],
        _ => bytes,
    }
}

/// Decode raw sender bytes to text.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn decode_sender(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Cow::Owned(decoded.into_owned())
        }
    }
}
