//! Text decoding for reference data files.

use std::borrow::Cow;

/// Decode bytes as UTF-8, falling back to Latin-1 when the input is not valid UTF-8.
///
/// Spreadsheet exports are frequently saved as Windows-1252/Latin-1; every
/// byte maps to the code point of the same value in that case. A leading
/// UTF-8 byte order mark is dropped.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_borrowed() {
        let decoded = decode_text("Crème".as_bytes());
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "Crème");
    }

    #[test]
    fn test_latin1_fallback() {
        let decoded = decode_text(b"Cr\xe8me");
        assert_eq!(decoded, "Crème");
    }

    #[test]
    fn test_bom_is_stripped() {
        assert_eq!(decode_text(b"\xef\xbb\xbfDisease"), "Disease");
    }
}
