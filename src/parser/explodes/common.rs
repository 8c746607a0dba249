use std::str::FromStr;

use log::{debug, warn};

use crate::error::{Result, ShareLinkError};
use crate::models::{NodeInfo, Scheme};
use crate::utils::base64::base64_decode_str;

/// Prefix table, checked in order and only at the start of a link.
///
/// `hysteria2://` and `hy2://` must stay ahead of `hysteria://`.
const SCHEME_PREFIXES: [(&str, Scheme); 9] = [
    ("socks://", Scheme::Socks),
    ("ss://", Scheme::Shadowsocks),
    ("vmess://", Scheme::VMess),
    ("vless://", Scheme::Vless),
    ("trojan://", Scheme::Trojan),
    ("hysteria2://", Scheme::Hysteria2),
    ("hy2://", Scheme::Hysteria2),
    ("hysteria://", Scheme::Hysteria),
    ("wireguard://", Scheme::WireGuard),
];

/// Returns the scheme whose prefix starts `link`, if any.
pub fn detect_scheme(link: &str) -> Option<Scheme> {
    SCHEME_PREFIXES
        .iter()
        .find(|(prefix, _)| link.starts_with(prefix))
        .map(|(_, scheme)| *scheme)
}

/// The scheme part of a link (`xyz://`), or the whole input when it has none.
pub(crate) fn link_prefix(link: &str) -> String {
    match link.find("://") {
        Some(pos) => link[..pos + 3].to_string(),
        None => link.to_string(),
    }
}

/// Explode a share link into a [`NodeInfo`]
///
/// This function detects the type of the link and calls the matching parser.
/// Unknown prefixes are rejected without attempting any decoding.
pub fn explode(link: &str) -> Result<NodeInfo> {
    let link = link.trim();

    let scheme = detect_scheme(link).ok_or_else(|| ShareLinkError::UnsupportedScheme {
        prefix: link_prefix(link),
    })?;

    let node = match scheme {
        Scheme::Socks => super::socks::explode_socks(link),
        Scheme::Shadowsocks => super::ss::explode_ss(link),
        Scheme::VMess => super::vmess::explode_vmess(link),
        Scheme::Vless => super::vless::explode_vless(link),
        Scheme::Trojan => super::trojan::explode_trojan(link),
        Scheme::Hysteria => super::hysteria::explode_hysteria(link),
        Scheme::Hysteria2 => super::hysteria2::explode_hysteria2(link),
        Scheme::WireGuard => super::wireguard::explode_wireguard(link),
    }?;

    debug!("parsed {} node {}", scheme, node.endpoint());
    Ok(node)
}

impl FromStr for NodeInfo {
    type Err = ShareLinkError;

    fn from_str(s: &str) -> Result<Self> {
        explode(s)
    }
}

/// Explode subscription content into one result per link
///
/// The content may be a plain list of links or a base64-encoded one. Blank
/// lines are skipped; a bad line yields an error entry and does not stop the
/// remaining lines from being parsed.
pub fn explode_sub(content: &str) -> Vec<Result<NodeInfo>> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    let decoded = if detect_scheme(content).is_some() {
        content.to_string()
    } else {
        base64_decode_str(content).unwrap_or_else(|| content.to_string())
    };

    let results: Vec<Result<NodeInfo>> = decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(explode)
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!("{} of {} subscription lines could not be parsed", failed, results.len());
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;

    #[test]
    fn test_detect_scheme_prefers_full_prefixes() {
        assert_eq!(detect_scheme("hysteria2://a@b:1"), Some(Scheme::Hysteria2));
        assert_eq!(detect_scheme("hy2://a@b:1"), Some(Scheme::Hysteria2));
        assert_eq!(detect_scheme("hysteria://b:1"), Some(Scheme::Hysteria));
        assert_eq!(detect_scheme("ssr://abc"), None);
        assert_eq!(detect_scheme("x-vless://abc"), None);
        assert_eq!(detect_scheme(" vless://abc"), None);
    }

    #[test]
    fn test_unsupported_prefix() {
        assert_eq!(
            explode("foobar://anything"),
            Err(ShareLinkError::UnsupportedScheme {
                prefix: "foobar://".to_string()
            })
        );
        assert_eq!(
            explode("just text"),
            Err(ShareLinkError::UnsupportedScheme {
                prefix: "just text".to_string()
            })
        );
    }

    #[test]
    fn test_explode_sub_base64_and_plain() {
        let links = "trojan://pw@a.com:443#A\n\nfoobar://x\r\nss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@1.2.3.4:8388#B\n";
        let plain = explode_sub(links);
        assert_eq!(plain.len(), 3);
        assert!(plain[0].is_ok());
        assert!(plain[1].is_err());
        assert_eq!(plain[2].as_ref().unwrap().remark, "B");

        let encoded = explode_sub(&base64_encode(links));
        assert_eq!(encoded, plain);
        assert!(explode_sub("   ").is_empty());
    }
}
