use crate::error::{MalformedReason, Result, ShareLinkError};
use crate::models::{Identity, NodeInfo, Scheme};

use super::link::{split_host_port, strip_scheme, LinkParts};
use super::stream::{security_from_query, transport_from_query};

/// Parse a VLESS link into a NodeInfo
///
/// Format: `vless://uuid@host:port?encryption=none&security=tls&type=ws&...#remark`
pub fn explode_vless(vless: &str) -> Result<NodeInfo> {
    let body = strip_scheme(vless, &["vless://"])?;
    let parts = LinkParts::split(body);

    let id = parts
        .decoded_userinfo()
        .ok_or_else(|| ShareLinkError::missing(Scheme::Vless, "id"))?;
    let (address, port) = split_host_port(parts.authority, Scheme::Vless)?;
    let port = port.ok_or_else(|| ShareLinkError::missing(Scheme::Vless, "port"))?;

    let query = &parts.query;
    if let Some(encryption) = query.get(&["encryption"]) {
        if !encryption.eq_ignore_ascii_case("none") {
            return Err(ShareLinkError::malformed(
                Scheme::Vless,
                MalformedReason::Encryption,
            ));
        }
    }

    let (transport, transport_settings) = transport_from_query(query, Scheme::Vless)?;
    let security = security_from_query(query, Scheme::Vless)?;

    let node = NodeInfo {
        scheme: Scheme::Vless,
        address,
        port,
        identity: Identity::Vless {
            id,
            flow: query.get_string(&["flow"]),
        },
        transport,
        transport_settings,
        security,
        remark: parts.remark,
    };
    node.validate()?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Network, RealitySettings, Security, TlsSettings, TransportSettings};

    #[test]
    fn test_explode_vless_ws_tls() {
        let node = explode_vless(
            "vless://11111111-2222-3333-4444-555555555555@example.com:443?encryption=none&security=tls&sni=example.com&type=ws&path=%2Fws#My-Node",
        )
        .unwrap();
        assert_eq!(node.address, "example.com");
        assert_eq!(node.port, 443);
        assert_eq!(
            node.identity,
            Identity::Vless {
                id: "11111111-2222-3333-4444-555555555555".to_string(),
                flow: None
            }
        );
        assert_eq!(node.transport, Network::Ws);
        assert_eq!(
            node.transport_settings,
            TransportSettings::Ws {
                path: Some("/ws".to_string()),
                host: None
            }
        );
        assert_eq!(
            node.security,
            Security::Tls(TlsSettings {
                sni: Some("example.com".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(node.remark, "My-Node");
    }

    #[test]
    fn test_explode_vless_reality_vision() {
        let node = explode_vless(
            "vless://uuid-1@1.2.3.4:8443?security=reality&pbk=PUBKEY&sid=ab12&spx=%2F&sni=www.microsoft.com&fp=chrome&flow=xtls-rprx-vision#R",
        )
        .unwrap();
        assert_eq!(
            node.identity,
            Identity::Vless {
                id: "uuid-1".to_string(),
                flow: Some("xtls-rprx-vision".to_string())
            }
        );
        assert_eq!(node.transport, Network::Tcp);
        assert_eq!(
            node.security,
            Security::Reality(RealitySettings {
                tls: TlsSettings {
                    sni: Some("www.microsoft.com".to_string()),
                    fingerprint: Some("chrome".to_string()),
                    ..Default::default()
                },
                public_key: "PUBKEY".to_string(),
                short_id: Some("ab12".to_string()),
                spider_x: Some("/".to_string()),
            })
        );
    }

    #[test]
    fn test_explode_vless_rejects_encryption() {
        assert_eq!(
            explode_vless("vless://id@a.com:443?encryption=aes-128-gcm"),
            Err(ShareLinkError::MalformedLink {
                scheme: Scheme::Vless,
                reason: MalformedReason::Encryption
            })
        );
    }

    #[test]
    fn test_explode_vless_missing_parts() {
        assert_eq!(
            explode_vless("vless://a.com:443?security=none"),
            Err(ShareLinkError::MissingField {
                scheme: Scheme::Vless,
                field: "id"
            })
        );
        assert_eq!(
            explode_vless("vless://id@a.com?security=none"),
            Err(ShareLinkError::MissingField {
                scheme: Scheme::Vless,
                field: "port"
            })
        );
        assert_eq!(
            explode_vless("vless://id@a.com:443?security=reality&sni=a.com"),
            Err(ShareLinkError::MissingField {
                scheme: Scheme::Vless,
                field: "publicKey"
            })
        );
    }
}
