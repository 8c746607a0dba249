use log::debug;

use crate::error::{MalformedReason, Result, ShareLinkError};
use crate::models::{Identity, NodeInfo, Network, Scheme, Security, TransportSettings};
use crate::utils::base64::base64_decode_str;

use super::link::{decode_credentials, split_host_port, strip_scheme, LinkParts};

/// Parse a Shadowsocks link into a NodeInfo
///
/// Handles both SIP002 (`ss://base64(method:password)@server:port#remark`,
/// also with a percent-encoded plain `method:password`) and the legacy form
/// where the whole `method:password@server:port` is base64-encoded.
pub fn explode_ss(ss: &str) -> Result<NodeInfo> {
    let body = strip_scheme(ss, &["ss://"])?;
    let parts = LinkParts::split(body);
    let decode_error = || ShareLinkError::malformed(Scheme::Shadowsocks, MalformedReason::Decode);

    let (secret, address) = match parts.userinfo {
        Some(userinfo) => (
            decode_credentials(userinfo).ok_or_else(decode_error)?,
            parts.authority.to_string(),
        ),
        None => {
            // base64 may contain '/', so put back whatever was split off as a path
            let encoded = format!("{}{}", parts.authority, parts.path);
            let decoded = base64_decode_str(encoded.trim_end_matches('/')).ok_or_else(decode_error)?;
            let (secret, address) = decoded.rsplit_once('@').ok_or_else(decode_error)?;
            (secret.to_string(), address.to_string())
        }
    };

    let (method, password) = secret
        .split_once(':')
        .ok_or_else(|| ShareLinkError::missing(Scheme::Shadowsocks, "password"))?;

    if parts.query.get(&["plugin"]).is_some() {
        debug!("ignoring shadowsocks plugin parameters");
    }

    let (host, port) = split_host_port(&address, Scheme::Shadowsocks)?;
    let port = port.ok_or_else(|| ShareLinkError::missing(Scheme::Shadowsocks, "port"))?;

    let node = NodeInfo {
        scheme: Scheme::Shadowsocks,
        address: host,
        port,
        identity: Identity::Shadowsocks {
            method: method.to_string(),
            password: password.to_string(),
        },
        transport: Network::Tcp,
        transport_settings: TransportSettings::default(),
        security: Security::None,
        remark: parts.remark,
    };
    node.validate()?;
    Ok(node)
}
