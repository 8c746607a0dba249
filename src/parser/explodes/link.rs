//! Shared splitting of URI-shaped share links.
//!
//! Share links are not reliably valid URLs (base64 user info may contain `/`,
//! hysteria2 authorities may list several ports), so they are taken apart by
//! hand: fragment first, then query, then the last `@`, then the path.

use std::str::FromStr;

use crate::error::{MalformedReason, Result, ShareLinkError};
use crate::models::Scheme;
use crate::utils::base64::base64_decode_str;
use crate::utils::url::{parse_query, url_decode};

/// Removes the first matching prefix from `link`.
pub(crate) fn strip_scheme<'a>(link: &'a str, prefixes: &[&str]) -> Result<&'a str> {
    prefixes
        .iter()
        .find_map(|prefix| link.strip_prefix(prefix))
        .ok_or_else(|| ShareLinkError::UnsupportedScheme {
            prefix: super::common::link_prefix(link),
        })
}

/// Components of a share link body (the text after `scheme://`).
#[derive(Debug)]
pub(crate) struct LinkParts<'a> {
    /// Raw user info, still percent-encoded.
    pub userinfo: Option<&'a str>,
    pub authority: &'a str,
    pub path: &'a str,
    pub query: Query,
    /// Percent-decoded fragment.
    pub remark: String,
}

impl<'a> LinkParts<'a> {
    pub fn split(body: &'a str) -> Self {
        let (rest, remark) = match body.split_once('#') {
            Some((rest, fragment)) => (rest, url_decode(fragment)),
            None => (body, String::new()),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Query::parse(query)),
            None => (rest, Query::default()),
        };
        let (userinfo, rest) = match rest.rfind('@') {
            Some(pos) => (Some(&rest[..pos]), &rest[pos + 1..]),
            None => (None, rest),
        };
        let (authority, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, ""),
        };
        LinkParts {
            userinfo,
            authority,
            path,
            query,
            remark,
        }
    }

    /// Percent-decoded user info, `None` when absent or empty.
    pub fn decoded_userinfo(&self) -> Option<String> {
        self.userinfo
            .filter(|u| !u.is_empty())
            .map(url_decode)
    }
}

/// Decodes a `name:secret` credential block that is either percent-encoded
/// plain text or base64 (standard or URL-safe, padding optional).
///
/// Returns `None` when neither form yields a `:`-separated pair.
pub(crate) fn decode_credentials(raw: &str) -> Option<String> {
    let plain = url_decode(raw);
    if plain.contains(':') {
        return Some(plain);
    }
    base64_decode_str(&plain).filter(|decoded| decoded.contains(':'))
}

/// Splits `host[:port]`, accepting bracketed IPv6 literals.
///
/// A missing port yields `None`; a present but invalid or zero port is an
/// address error.
pub(crate) fn split_host_port(authority: &str, scheme: Scheme) -> Result<(String, Option<u16>)> {
    let bad_address = || ShareLinkError::malformed(scheme, MalformedReason::Address);

    let (host, port) = if let Some(inner) = authority.strip_prefix('[') {
        let (host, after) = inner.split_once(']').ok_or_else(bad_address)?;
        match after {
            "" => (host, None),
            _ => (host, Some(after.strip_prefix(':').ok_or_else(bad_address)?)),
        }
    } else if authority.matches(':').count() > 1 {
        // Bare IPv6 literal without a port.
        (authority, None)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() || host.chars().any(|c| c.is_whitespace() || c == '/' || c == '@') {
        return Err(bad_address());
    }
    let port = match port {
        Some(p) => match p.parse::<u16>() {
            Ok(p) if p != 0 => Some(p),
            _ => return Err(bad_address()),
        },
        None => None,
    };
    Ok((host.to_string(), port))
}

/// Decoded query string with alias-aware lookups.
#[derive(Debug, Default)]
pub(crate) struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn parse(query: &str) -> Self {
        Query {
            pairs: parse_query(query),
        }
    }

    /// Value of the first alias that is present with a non-empty value.
    pub fn get(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| {
            self.pairs
                .iter()
                .find(|(k, v)| k == key && !v.is_empty())
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn get_string(&self, keys: &[&str]) -> Option<String> {
        self.get(keys).map(str::to_string)
    }

    /// `1` and `true` (any case) are truthy; everything else is false.
    pub fn flag(&self, keys: &[&str]) -> bool {
        self.get(keys)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Parses a numeric parameter; an unparsable value is an error naming the
    /// first alias.
    pub fn number<T: FromStr>(&self, keys: &[&'static str], scheme: Scheme) -> Result<Option<T>> {
        match self.get(keys) {
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                ShareLinkError::malformed(scheme, MalformedReason::Parameter(keys[0]))
            }),
            None => Ok(None),
        }
    }

    /// Comma-separated list parameter, blanks dropped.
    pub fn list(&self, keys: &[&str]) -> Vec<String> {
        self.get(keys).map(split_list).unwrap_or_default()
    }
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
