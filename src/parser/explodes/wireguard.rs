use crate::error::{MalformedReason, Result, ShareLinkError};
use crate::models::{Identity, Network, NodeInfo, Scheme, Security, TransportSettings, WireGuardSettings};
use crate::utils::base64::base64_decode_lenient;

use super::link::{split_host_port, split_list, strip_scheme, LinkParts, Query};

const WIREGUARD_DEFAULT_PORT: u16 = 51820;

/// Query decoding turns an unescaped `+` into a space; keys are base64, so
/// put it back.
fn key_param(query: &Query, keys: &[&str]) -> Option<String> {
    query.get(keys).map(|k| k.trim().replace(' ', "+"))
}

/// `reserved` is either a comma list of bytes (`1,2,3`) or three bytes in base64.
fn parse_reserved(raw: &str) -> Result<Vec<u8>> {
    let bad = || ShareLinkError::malformed(Scheme::WireGuard, MalformedReason::Parameter("reserved"));
    if raw.contains(',') || raw.chars().all(|c| c.is_ascii_digit()) {
        return split_list(raw)
            .iter()
            .map(|b| b.parse::<u8>().map_err(|_| bad()))
            .collect();
    }
    match base64_decode_lenient(&raw.replace(' ', "+")) {
        Some(bytes) if bytes.len() == 3 => Ok(bytes),
        _ => Err(bad()),
    }
}

/// Parse a WireGuard link into a NodeInfo
///
/// Format: `wireguard://privateKey@host:port?publickey=...&address=10.0.0.2/32&mtu=1420&reserved=1,2,3#remark`
pub fn explode_wireguard(wireguard: &str) -> Result<NodeInfo> {
    let body = strip_scheme(wireguard, &["wireguard://"])?;
    let parts = LinkParts::split(body);
    let query = &parts.query;

    let (address, port) = split_host_port(parts.authority, Scheme::WireGuard)?;

    let secret_key = parts
        .decoded_userinfo()
        .or_else(|| key_param(query, &["privateKey", "privatekey", "secretKey"]))
        .ok_or_else(|| ShareLinkError::missing(Scheme::WireGuard, "privateKey"))?;
    let peer_public_key = key_param(query, &["publickey", "publicKey", "peerPublicKey"])
        .ok_or_else(|| ShareLinkError::missing(Scheme::WireGuard, "publicKey"))?;

    let mut local_address = query.list(&["address", "ip", "selfIP"]);
    local_address.extend(query.list(&["selfIPv6"]));
    if local_address.is_empty() {
        return Err(ShareLinkError::missing(Scheme::WireGuard, "address"));
    }

    let settings = WireGuardSettings {
        mtu: query.number(&["mtu"], Scheme::WireGuard)?,
        reserved: query.get(&["reserved"]).map(parse_reserved).transpose()?,
        pre_shared_key: key_param(query, &["presharedkey", "preSharedKey", "presharedKey"]),
    };

    let node = NodeInfo {
        scheme: Scheme::WireGuard,
        address,
        port: port.unwrap_or(WIREGUARD_DEFAULT_PORT),
        identity: Identity::WireGuard {
            secret_key,
            local_address,
            peer_public_key,
        },
        transport: Network::Tcp,
        transport_settings: TransportSettings::WireGuard(settings),
        security: Security::None,
        remark: parts.remark,
    };
    node.validate()?;
    Ok(node)
}
