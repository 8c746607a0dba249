use log::debug;

use crate::error::Result;
use crate::models::{
    Hysteria2Settings, Identity, Network, NodeInfo, Scheme, Security, TlsSettings,
    TransportSettings,
};

use super::link::{split_host_port, strip_scheme, LinkParts};

const HYSTERIA2_DEFAULT_PORT: u16 = 443;

/// Separates a port-hopping list (`host:443,5000-6000`) from the authority.
///
/// Returns the authority rewritten to a single port (or none) and the full
/// port list when one was given.
fn split_port_list(authority: &str) -> (String, Option<String>) {
    let port_start = if authority.starts_with('[') {
        authority.find("]:").map(|pos| pos + 1)
    } else if authority.matches(':').count() == 1 {
        authority.find(':')
    } else {
        None
    };
    let Some(colon) = port_start else {
        return (authority.to_string(), None);
    };

    let (host, ports) = (&authority[..colon], &authority[colon + 1..]);
    if !ports.contains(',') && !ports.contains('-') {
        return (authority.to_string(), None);
    }
    let first = ports.split(',').next().unwrap_or_default();
    let rewritten = if first.chars().all(|c| c.is_ascii_digit()) && !first.is_empty() {
        format!("{}:{}", host, first)
    } else {
        host.to_string()
    };
    (rewritten, Some(ports.to_string()))
}

/// Parse a Hysteria2 link into a NodeInfo (handles both `hysteria2://` and `hy2://`)
pub fn explode_hysteria2(hysteria2: &str) -> Result<NodeInfo> {
    let body = strip_scheme(hysteria2, &["hysteria2://", "hy2://"])?;
    let parts = LinkParts::split(body);
    let query = &parts.query;

    let (authority, authority_ports) = split_port_list(parts.authority);
    let (address, port) = split_host_port(&authority, Scheme::Hysteria2)?;

    if query.get(&["pinSHA256"]).is_some() {
        debug!("hysteria2 certificate pin ignored for {}", address);
    }

    let settings = Hysteria2Settings {
        up_mbps: query.number(&["up", "upmbps"], Scheme::Hysteria2)?,
        down_mbps: query.number(&["down", "downmbps"], Scheme::Hysteria2)?,
        obfs: query.get_string(&["obfs"]),
        obfs_password: query.get_string(&["obfs-password", "obfsPassword"]),
        ports: query.get_string(&["mport", "ports"]).or(authority_ports),
    };

    let node = NodeInfo {
        scheme: Scheme::Hysteria2,
        address,
        port: port.unwrap_or(HYSTERIA2_DEFAULT_PORT),
        identity: Identity::Hysteria2 {
            password: parts
                .decoded_userinfo()
                .or_else(|| query.get_string(&["auth", "password"])),
        },
        transport: Network::Tcp,
        transport_settings: TransportSettings::Hysteria2(settings),
        security: Security::Tls(TlsSettings {
            sni: query.get_string(&["sni", "peer"]),
            alpn: query.list(&["alpn"]),
            fingerprint: query.get_string(&["fp", "fingerprint"]),
            allow_insecure: query.flag(&["insecure", "allowInsecure"]),
        }),
        remark: parts.remark,
    };
    node.validate()?;
    Ok(node)
}
