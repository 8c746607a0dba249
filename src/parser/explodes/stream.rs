//! Transport and security decoding shared by the v2ray-family parsers.

use crate::error::{MalformedReason, Result, ShareLinkError};
use crate::models::{Network, RealitySettings, Scheme, Security, TlsSettings, TransportSettings};

use super::link::{split_list, Query};

/// Raw transport values gathered from a link, before they are sorted into
/// the settings of one transport.
#[derive(Debug, Default)]
pub(crate) struct StreamFields<'a> {
    pub header_type: Option<&'a str>,
    pub host: Option<&'a str>,
    pub path: Option<&'a str>,
    pub service_name: Option<&'a str>,
    pub mode: Option<&'a str>,
    pub seed: Option<&'a str>,
    pub quic_security: Option<&'a str>,
    pub key: Option<&'a str>,
}

fn owned(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Like [`owned`], but `none` counts as absent.
fn owned_type(value: Option<&str>) -> Option<String> {
    owned(value).filter(|v| !v.eq_ignore_ascii_case("none"))
}

/// Resolves a transport name to a [`Network`], failing on unknown names.
pub(crate) fn network_from(name: Option<&str>, scheme: Scheme) -> Result<Network> {
    let name = name.unwrap_or("tcp");
    Network::from_name(name.trim())
        .ok_or_else(|| ShareLinkError::malformed(scheme, MalformedReason::Parameter("type")))
}

/// Keeps only the fields relevant to `network`.
pub(crate) fn transport_settings(network: Network, fields: &StreamFields) -> TransportSettings {
    match network {
        Network::Tcp => {
            let header_type = owned_type(fields.header_type);
            // host and path only mean something with the HTTP header camouflage
            let http = header_type.as_deref() == Some("http");
            TransportSettings::Tcp {
                header_type,
                host: owned(fields.host).filter(|_| http),
                path: owned(fields.path).filter(|_| http),
            }
        }
        Network::Ws => TransportSettings::Ws {
            path: owned(fields.path),
            host: owned(fields.host),
        },
        Network::HttpUpgrade => TransportSettings::HttpUpgrade {
            path: owned(fields.path),
            host: owned(fields.host),
        },
        Network::Grpc => TransportSettings::Grpc {
            service_name: owned(fields.service_name),
            multi_mode: fields
                .mode
                .map(|m| m.eq_ignore_ascii_case("multi"))
                .unwrap_or(false),
        },
        Network::Kcp => TransportSettings::Kcp {
            header_type: owned_type(fields.header_type),
            seed: owned(fields.seed),
        },
        Network::Quic => TransportSettings::Quic {
            security: owned_type(fields.quic_security),
            key: owned(fields.key),
            header_type: owned_type(fields.header_type),
        },
        Network::H2 => TransportSettings::H2 {
            path: owned(fields.path),
            host: fields.host.map(split_list).unwrap_or_default(),
        },
    }
}

/// Transport of a vless/trojan style query string.
pub(crate) fn transport_from_query(
    query: &Query,
    scheme: Scheme,
) -> Result<(Network, TransportSettings)> {
    let mut network_name = query.get(&["type", "network"]);
    if network_name.is_none() && query.flag(&["ws"]) {
        network_name = Some("ws");
    }
    let network = network_from(network_name, scheme)?;
    let fields = StreamFields {
        header_type: query.get(&["headerType"]),
        host: query.get(&["host"]),
        path: query.get(&["path", "wspath"]),
        service_name: query.get(&["serviceName"]),
        mode: query.get(&["mode"]),
        seed: query.get(&["seed"]),
        quic_security: query.get(&["quicSecurity"]),
        key: query.get(&["key"]),
    };
    Ok((network, transport_settings(network, &fields)))
}

/// TLS parameters of a vless/trojan style query string.
pub(crate) fn tls_from_query(query: &Query) -> TlsSettings {
    TlsSettings {
        sni: query.get_string(&["sni", "peer"]),
        alpn: query.list(&["alpn"]),
        fingerprint: query.get_string(&["fp", "fingerprint"]),
        allow_insecure: query.flag(&["allowInsecure"]),
    }
}

/// Security layer of a vless/trojan style query string; `tls` unless the link
/// says otherwise.
pub(crate) fn security_from_query(query: &Query, scheme: Scheme) -> Result<Security> {
    let kind = query.get(&["security"]).unwrap_or("tls").to_ascii_lowercase();
    match kind.as_str() {
        "none" => Ok(Security::None),
        "tls" | "xtls" => Ok(Security::Tls(tls_from_query(query))),
        "reality" => {
            let public_key = query
                .get_string(&["pbk", "publicKey"])
                .ok_or_else(|| ShareLinkError::missing(scheme, "publicKey"))?;
            Ok(Security::Reality(RealitySettings {
                tls: tls_from_query(query),
                public_key,
                short_id: query.get_string(&["sid", "shortId"]),
                spider_x: query.get_string(&["spx", "spiderX"]),
            }))
        }
        _ => Err(ShareLinkError::malformed(
            scheme,
            MalformedReason::Parameter("security"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_drops_host_without_http_header() {
        let fields = StreamFields {
            host: Some("a.com"),
            path: Some("/"),
            ..Default::default()
        };
        assert_eq!(
            transport_settings(Network::Tcp, &fields),
            TransportSettings::Tcp {
                header_type: None,
                host: None,
                path: None
            }
        );

        let fields = StreamFields {
            header_type: Some("http"),
            host: Some("a.com"),
            path: Some("/"),
            ..Default::default()
        };
        assert_eq!(
            transport_settings(Network::Tcp, &fields),
            TransportSettings::Tcp {
                header_type: Some("http".to_string()),
                host: Some("a.com".to_string()),
                path: Some("/".to_string())
            }
        );
    }

    #[test]
    fn test_grpc_only_keeps_grpc_keys() {
        let query = Query::parse("type=grpc&serviceName=svc&mode=multi&path=%2Fignored&host=x");
        let (network, settings) = transport_from_query(&query, Scheme::Vless).unwrap();
        assert_eq!(network, Network::Grpc);
        assert_eq!(
            settings,
            TransportSettings::Grpc {
                service_name: Some("svc".to_string()),
                multi_mode: true
            }
        );
    }

    #[test]
    fn test_unknown_transport_and_security() {
        let query = Query::parse("type=carrier-pigeon");
        assert_eq!(
            transport_from_query(&query, Scheme::Trojan),
            Err(ShareLinkError::MalformedLink {
                scheme: Scheme::Trojan,
                reason: MalformedReason::Parameter("type")
            })
        );
        let query = Query::parse("security=ssl");
        assert!(security_from_query(&query, Scheme::Trojan).is_err());
    }

    #[test]
    fn test_security_defaults_to_tls() {
        let query = Query::parse("peer=b.com&alpn=h2,http%2F1.1");
        assert_eq!(
            security_from_query(&query, Scheme::Trojan).unwrap(),
            Security::Tls(TlsSettings {
                sni: Some("b.com".to_string()),
                alpn: vec!["h2".to_string(), "http/1.1".to_string()],
                fingerprint: None,
                allow_insecure: false,
            })
        );
    }

    #[test]
    fn test_xtls_is_treated_as_tls() {
        let query = Query::parse("security=xtls&sni=a.com");
        assert_eq!(
            security_from_query(&query, Scheme::Vless).unwrap(),
            Security::Tls(TlsSettings {
                sni: Some("a.com".to_string()),
                alpn: Vec::new(),
                fingerprint: None,
                allow_insecure: false,
            })
        );
    }

    #[test]
    fn test_transport_table() {
        let cases = [
            (
                "type=quic&quicSecurity=aes-128-gcm&key=k&headerType=wechat-video&path=%2Fx",
                Network::Quic,
                TransportSettings::Quic {
                    security: Some("aes-128-gcm".to_string()),
                    key: Some("k".to_string()),
                    header_type: Some("wechat-video".to_string()),
                },
            ),
            (
                "type=kcp&headerType=none&seed=s&host=x",
                Network::Kcp,
                TransportSettings::Kcp {
                    header_type: None,
                    seed: Some("s".to_string()),
                },
            ),
            (
                "type=httpupgrade&path=%2Fup&host=h.com&serviceName=x",
                Network::HttpUpgrade,
                TransportSettings::HttpUpgrade {
                    path: Some("/up".to_string()),
                    host: Some("h.com".to_string()),
                },
            ),
            (
                "type=h2&path=%2Fh&host=a.com,b.com",
                Network::H2,
                TransportSettings::H2 {
                    path: Some("/h".to_string()),
                    host: vec!["a.com".to_string(), "b.com".to_string()],
                },
            ),
        ];
        for (raw, network, settings) in cases {
            let query = Query::parse(raw);
            assert_eq!(
                transport_from_query(&query, Scheme::Vless).unwrap(),
                (network, settings),
                "{raw}"
            );
        }
    }
}
