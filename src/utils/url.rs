//! URL encoding/decoding utilities

/// Decodes a percent-encoded string
///
/// # Arguments
/// * `input` - The URL-encoded string to decode
///
/// # Returns
/// * String containing the decoded input
/// * Returns the original string if decoding fails
///
/// # Examples
/// ```
/// use shareurl::utils::url::url_decode;
///
/// let decoded = url_decode("My%20Node");
/// assert_eq!(decoded, "My Node");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Parses a query string into ordered, decoded key/value pairs.
///
/// `+` decodes to a space, as in `application/x-www-form-urlencoded`.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("%2Fws%3Fed%3D2048"), "/ws?ed=2048");
        assert_eq!(url_decode("%E4%BD%A0%E5%A5%BD"), "你好");
        // Invalid UTF-8 sequences are left untouched.
        assert_eq!(url_decode("%FF"), "%FF");
    }

    #[test]
    fn test_parse_query_keeps_order() {
        let pairs = parse_query("type=ws&path=%2Fws&host=a.com&alpn=h2%2Chttp%2F1.1");
        assert_eq!(
            pairs,
            vec![
                ("type".to_string(), "ws".to_string()),
                ("path".to_string(), "/ws".to_string()),
                ("host".to_string(), "a.com".to_string()),
                ("alpn".to_string(), "h2,http/1.1".to_string()),
            ]
        );
    }
}
