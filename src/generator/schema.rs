//! Per-core naming tables.
//!
//! Both tables are plain data: supporting another core means adding a
//! column here and a format module, not touching the dispatch logic.

use crate::models::{CoreType, Scheme};

/// Field names one core uses for concepts every outbound shares.
#[derive(Debug)]
pub(crate) struct Schema {
    pub protocol: &'static str,
    pub address: &'static str,
    pub port: &'static str,
    pub network: &'static str,
    pub service_name: &'static str,
    pub server_name: &'static str,
    pub alpn: &'static str,
    pub fingerprint: &'static str,
    pub insecure: &'static str,
    pub public_key: &'static str,
    pub short_id: &'static str,
    pub tag: &'static str,
    /// Whether the core understands REALITY at all.
    pub reality: bool,
}

const XRAY: Schema = Schema {
    protocol: "protocol",
    address: "address",
    port: "port",
    network: "network",
    service_name: "serviceName",
    server_name: "serverName",
    alpn: "alpn",
    fingerprint: "fingerprint",
    insecure: "allowInsecure",
    public_key: "publicKey",
    short_id: "shortId",
    tag: "tag",
    reality: true,
};

const V2RAY: Schema = Schema {
    reality: false,
    ..XRAY
};

const SING_BOX: Schema = Schema {
    protocol: "type",
    address: "server",
    port: "server_port",
    network: "type",
    service_name: "service_name",
    server_name: "server_name",
    alpn: "alpn",
    fingerprint: "fingerprint",
    insecure: "insecure",
    public_key: "public_key",
    short_id: "short_id",
    tag: "tag",
    reality: true,
};

const MIHOMO: Schema = Schema {
    protocol: "type",
    address: "server",
    port: "port",
    network: "network",
    service_name: "grpc-service-name",
    server_name: "servername",
    alpn: "alpn",
    fingerprint: "client-fingerprint",
    insecure: "skip-cert-verify",
    public_key: "public-key",
    short_id: "short-id",
    tag: "name",
    reality: true,
};

/// Protocol names, one column per core in [`CoreType::ALL`] order.
/// `None` marks a protocol the core cannot speak.
const PROTOCOLS: [(Scheme, [Option<&str>; 4]); 8] = [
    (Scheme::Socks, [Some("socks"), Some("socks"), Some("socks"), Some("socks5")]),
    (
        Scheme::Shadowsocks,
        [Some("shadowsocks"), Some("shadowsocks"), Some("shadowsocks"), Some("ss")],
    ),
    (Scheme::VMess, [Some("vmess"), Some("vmess"), Some("vmess"), Some("vmess")]),
    (Scheme::Vless, [Some("vless"), Some("vless"), Some("vless"), Some("vless")]),
    (Scheme::Trojan, [Some("trojan"), Some("trojan"), Some("trojan"), Some("trojan")]),
    (Scheme::Hysteria, [None, None, Some("hysteria"), Some("hysteria")]),
    (Scheme::Hysteria2, [None, None, Some("hysteria2"), Some("hysteria2")]),
    (Scheme::WireGuard, [Some("wireguard"), None, Some("wireguard"), Some("wireguard")]),
];

fn column(core: CoreType) -> usize {
    match core {
        CoreType::Xray => 0,
        CoreType::V2ray => 1,
        CoreType::SingBox => 2,
        CoreType::Mihomo => 3,
    }
}

pub(crate) fn schema(core: CoreType) -> &'static Schema {
    match core {
        CoreType::Xray => &XRAY,
        CoreType::V2ray => &V2RAY,
        CoreType::SingBox => &SING_BOX,
        CoreType::Mihomo => &MIHOMO,
    }
}

/// Protocol string `core` uses for `scheme`, if it supports it.
pub(crate) fn protocol_name(core: CoreType, scheme: Scheme) -> Option<&'static str> {
    PROTOCOLS
        .iter()
        .find(|(s, _)| *s == scheme)
        .and_then(|(_, names)| names[column(core)])
}
