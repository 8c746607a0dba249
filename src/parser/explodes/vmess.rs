use log::trace;
use serde_json::Value;

use crate::error::{MalformedReason, Result, ShareLinkError};
use crate::models::{Identity, Network, NodeInfo, Scheme, Security, TlsSettings};
use crate::utils::base64::base64_decode_str;

use super::link::{split_list, strip_scheme};
use super::stream::{transport_settings, StreamFields};

/// Reads a field that producers emit either as a string or as a number.
fn json_text(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_flag(json: &Value, key: &str) -> bool {
    json_text(json, key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Parse a VMess link into a NodeInfo
///
/// The payload after `vmess://` is a base64-encoded JSON document in the
/// v2rayN layout (`add`, `port`, `id`, `aid`, `scy`, `net`, `type`, `host`,
/// `path`, `tls`, `sni`, `alpn`, `fp`, `ps`).
pub fn explode_vmess(vmess: &str) -> Result<NodeInfo> {
    let encoded = strip_scheme(vmess, &["vmess://"])?;
    // Some producers append a fragment to the base64 block; it carries no data.
    let encoded = encoded.split('#').next().unwrap_or_default();
    let decode_error = || ShareLinkError::malformed(Scheme::VMess, MalformedReason::Decode);

    let decoded = base64_decode_str(encoded).ok_or_else(decode_error)?;
    let json: Value = serde_json::from_str(&decoded).map_err(|_| decode_error())?;
    if !json.is_object() {
        return Err(decode_error());
    }

    let address = json_text(&json, "add").ok_or_else(|| ShareLinkError::missing(Scheme::VMess, "add"))?;
    let port = json_text(&json, "port").ok_or_else(|| ShareLinkError::missing(Scheme::VMess, "port"))?;
    let id = json_text(&json, "id").ok_or_else(|| ShareLinkError::missing(Scheme::VMess, "id"))?;

    let port = match port.parse::<u16>() {
        Ok(p) if p != 0 => p,
        _ => return Err(ShareLinkError::malformed(Scheme::VMess, MalformedReason::Address)),
    };
    let alter_id = match json_text(&json, "aid") {
        Some(aid) => aid
            .parse::<u16>()
            .map_err(|_| ShareLinkError::malformed(Scheme::VMess, MalformedReason::Parameter("aid")))?,
        None => 0,
    };
    let cipher = json_text(&json, "scy").unwrap_or_else(|| "auto".to_string());

    let net = json_text(&json, "net");
    let network = Network::from_name(net.as_deref().unwrap_or("tcp"))
        .ok_or_else(|| ShareLinkError::malformed(Scheme::VMess, MalformedReason::Parameter("net")))?;
    let header_type = json_text(&json, "type");
    let host = json_text(&json, "host");
    let path = json_text(&json, "path");

    // v2rayN reuses host/path/type for whatever the transport needs
    let fields = StreamFields {
        header_type: header_type.as_deref(),
        host: host.as_deref(),
        path: path.as_deref(),
        service_name: path.as_deref(),
        mode: header_type.as_deref(),
        seed: path.as_deref(),
        quic_security: host.as_deref(),
        key: path.as_deref(),
    };
    let transport_settings = transport_settings(network, &fields);

    let security = match json_text(&json, "tls").as_deref() {
        None | Some("none") => Security::None,
        Some("tls") => Security::Tls(TlsSettings {
            sni: json_text(&json, "sni"),
            alpn: json_text(&json, "alpn")
                .map(|a| split_list(&a))
                .unwrap_or_default(),
            fingerprint: json_text(&json, "fp"),
            allow_insecure: json_flag(&json, "allowInsecure") || json_flag(&json, "insecure"),
        }),
        Some(_) => {
            return Err(ShareLinkError::malformed(
                Scheme::VMess,
                MalformedReason::Parameter("tls"),
            ))
        }
    };

    trace!("vmess node {}:{} net={}", address, port, network);

    let node = NodeInfo {
        scheme: Scheme::VMess,
        address,
        port,
        identity: Identity::VMess {
            id,
            alter_id,
            security: cipher,
        },
        transport: network,
        transport_settings,
        security,
        remark: json_text(&json, "ps").unwrap_or_default(),
    };
    node.validate()?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransportSettings;
    use crate::utils::base64::base64_encode;

    fn link(json: &str) -> String {
        format!("vmess://{}", base64_encode(json))
    }

    #[test]
    fn test_explode_vmess_ws_tls() {
        let json = r#"{"v":"2","ps":"HK 01","add":"hk.example.com","port":"443","id":"b831381d-6324-4d53-ad4f-8cda48b30811","aid":"0","scy":"auto","net":"ws","type":"none","host":"cdn.example.com","path":"/ray","tls":"tls","sni":"hk.example.com","alpn":"h2,http/1.1","fp":"chrome"}"#;
        let node = explode_vmess(&link(json)).unwrap();
        assert_eq!(node.scheme, Scheme::VMess);
        assert_eq!(node.address, "hk.example.com");
        assert_eq!(node.port, 443);
        assert_eq!(node.remark, "HK 01");
        assert_eq!(
            node.identity,
            Identity::VMess {
                id: "b831381d-6324-4d53-ad4f-8cda48b30811".to_string(),
                alter_id: 0,
                security: "auto".to_string()
            }
        );
        assert_eq!(node.transport, Network::Ws);
        assert_eq!(
            node.transport_settings,
            TransportSettings::Ws {
                path: Some("/ray".to_string()),
                host: Some("cdn.example.com".to_string())
            }
        );
        assert_eq!(
            node.security,
            Security::Tls(TlsSettings {
                sni: Some("hk.example.com".to_string()),
                alpn: vec!["h2".to_string(), "http/1.1".to_string()],
                fingerprint: Some("chrome".to_string()),
                allow_insecure: false,
            })
        );
    }

    #[test]
    fn test_explode_vmess_numeric_port_and_grpc() {
        let json = r#"{"add":"1.1.1.1","port":8443,"id":"id-1","aid":2,"net":"grpc","type":"multi","path":"svc","tls":""}"#;
        let node = explode_vmess(&link(json)).unwrap();
        assert_eq!(node.port, 8443);
        assert!(matches!(node.identity, Identity::VMess { alter_id: 2, .. }));
        assert_eq!(
            node.transport_settings,
            TransportSettings::Grpc {
                service_name: Some("svc".to_string()),
                multi_mode: true
            }
        );
        assert_eq!(node.security, Security::None);
        assert_eq!(node.remark, "");
    }

    #[test]
    fn test_explode_vmess_missing_id() {
        let json = r#"{"add":"1.1.1.1","port":"443","net":"tcp","tls":"tls"}"#;
        assert_eq!(
            explode_vmess(&link(json)),
            Err(ShareLinkError::MissingField {
                scheme: Scheme::VMess,
                field: "id"
            })
        );
    }

    #[test]
    fn test_explode_vmess_decode_errors() {
        let decode = Err(ShareLinkError::MalformedLink {
            scheme: Scheme::VMess,
            reason: MalformedReason::Decode,
        });
        assert_eq!(explode_vmess("vmess://***"), decode);
        assert_eq!(explode_vmess(&link("not json")), decode);
        assert_eq!(explode_vmess(&link("[1,2]")), decode);
        assert_eq!(
            explode_vmess(&link(r#"{"add":"a.com","port":"0","id":"x"}"#)),
            Err(ShareLinkError::MalformedLink {
                scheme: Scheme::VMess,
                reason: MalformedReason::Address
            })
        );
    }

    #[test]
    fn test_explode_vmess_cipher_and_tls_are_separate() {
        let json = r#"{"add":"a.com","port":"443","id":"id-2","scy":"chacha20-poly1305","net":"tcp","tls":"tls","sni":"b.com"}"#;
        let node = explode_vmess(&link(json)).unwrap();
        assert_eq!(
            node.identity,
            Identity::VMess {
                id: "id-2".to_string(),
                alter_id: 0,
                security: "chacha20-poly1305".to_string()
            }
        );
        assert_eq!(
            node.security,
            Security::Tls(TlsSettings {
                sni: Some("b.com".to_string()),
                alpn: Vec::new(),
                fingerprint: None,
                allow_insecure: false,
            })
        );
    }
}
