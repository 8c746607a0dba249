use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// Standard alphabet, padding optional, stray trailing bits accepted.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Decodes Base64 produced by any of the encoders found in share links.
///
/// Accepts both the standard and the URL-safe alphabet, with or without
/// padding, and ignores embedded whitespace and line breaks.
///
/// # Returns
/// The decoded bytes, or `None` if the input is not Base64 at all.
pub fn base64_decode_lenient(input: &str) -> Option<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    let standard = url_safe_base64_reverse(cleaned.trim_end_matches('='));
    LENIENT.decode(standard).ok()
}

/// Like [`base64_decode_lenient`], but also requires the payload to be UTF-8.
pub fn base64_decode_str(input: &str) -> Option<String> {
    base64_decode_lenient(input).and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_standard_and_urlsafe() {
        assert_eq!(
            base64_decode_str("YWVzLTI1Ni1nY206cGFzc3dvcmQ="),
            Some("aes-256-gcm:password".to_string())
        );
        // "??>" encodes to "Pz8+" in standard and "Pz8-" in URL-safe.
        assert_eq!(base64_decode_lenient("Pz8+"), Some(b"??>".to_vec()));
        assert_eq!(base64_decode_lenient("Pz8-"), Some(b"??>".to_vec()));
    }

    #[test]
    fn test_decode_without_padding_and_with_newlines() {
        assert_eq!(
            base64_decode_str("YWVzLTI1Ni1nY206cGFzc3dvcmQ"),
            Some("aes-256-gcm:password".to_string())
        );
        assert_eq!(
            base64_decode_str("YWVzLTI1Ni1n\nY206cGFzc3dvcmQ=\r\n"),
            Some("aes-256-gcm:password".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(base64_decode_lenient(""), None);
        assert_eq!(base64_decode_lenient("not base64!"), None);
        assert_eq!(base64_decode_lenient("1.2.3.4:1080"), None);
        assert_eq!(base64_encode("a:b"), "YTpi");
    }
}
