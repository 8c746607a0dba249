use crate::error::{Result, ShareLinkError};
use crate::models::{Identity, NodeInfo, Scheme};

use super::link::{split_host_port, strip_scheme, LinkParts};
use super::stream::{security_from_query, transport_from_query};

const TROJAN_DEFAULT_PORT: u16 = 443;

/// Parse a Trojan link into a NodeInfo
///
/// Accepts the `type=`/`path=` transport keys as well as the older
/// trojan-go style `ws=1&wspath=`.
pub fn explode_trojan(trojan: &str) -> Result<NodeInfo> {
    let body = strip_scheme(trojan, &["trojan://"])?;
    let parts = LinkParts::split(body);

    let password = parts
        .decoded_userinfo()
        .ok_or_else(|| ShareLinkError::missing(Scheme::Trojan, "password"))?;
    let (address, port) = split_host_port(parts.authority, Scheme::Trojan)?;

    let (transport, transport_settings) = transport_from_query(&parts.query, Scheme::Trojan)?;
    let security = security_from_query(&parts.query, Scheme::Trojan)?;

    let node = NodeInfo {
        scheme: Scheme::Trojan,
        address,
        port: port.unwrap_or(TROJAN_DEFAULT_PORT),
        identity: Identity::Trojan { password },
        transport,
        transport_settings,
        security,
        remark: parts.remark,
    };
    node.validate()?;
    Ok(node)
}
