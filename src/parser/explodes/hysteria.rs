use log::debug;

use crate::error::{Result, ShareLinkError};
use crate::models::{
    HysteriaSettings, Identity, Network, NodeInfo, Scheme, Security, TlsSettings,
    TransportSettings,
};

use super::link::{split_host_port, strip_scheme, LinkParts};

/// Parse a Hysteria (v1) link into a NodeInfo
///
/// Format: `hysteria://host:port?protocol=udp&auth=xxx&peer=sni&insecure=1&upmbps=100&downmbps=100&alpn=h3&obfsParam=key#remark`
pub fn explode_hysteria(hysteria: &str) -> Result<NodeInfo> {
    let body = strip_scheme(hysteria, &["hysteria://"])?;
    let parts = LinkParts::split(body);
    let query = &parts.query;

    let (address, port) = split_host_port(parts.authority, Scheme::Hysteria)?;
    let port = port.ok_or_else(|| ShareLinkError::missing(Scheme::Hysteria, "port"))?;

    let up_mbps = query
        .number::<u32>(&["upmbps", "up"], Scheme::Hysteria)?
        .ok_or_else(|| ShareLinkError::missing(Scheme::Hysteria, "upmbps"))?;
    let down_mbps = query
        .number::<u32>(&["downmbps", "down"], Scheme::Hysteria)?
        .ok_or_else(|| ShareLinkError::missing(Scheme::Hysteria, "downmbps"))?;

    // `obfs=xplus` only names the mode; the key itself is in obfsParam
    let obfs = query
        .get_string(&["obfsParam"])
        .or_else(|| query.get_string(&["obfs"]).filter(|o| o != "xplus"));

    let settings = HysteriaSettings {
        protocol: query.get_string(&["protocol"]),
        up_mbps,
        down_mbps,
        obfs,
        recv_window_conn: query.number(&["recv_window_conn"], Scheme::Hysteria)?,
        recv_window: query.number(&["recv_window"], Scheme::Hysteria)?,
        disable_mtu_discovery: query.flag(&["disable_mtu_discovery"]),
    };
    debug!("hysteria {}:{} up={} down={}", address, port, up_mbps, down_mbps);

    let node = NodeInfo {
        scheme: Scheme::Hysteria,
        address,
        port,
        identity: Identity::Hysteria {
            auth: query
                .get_string(&["auth", "auth_str"])
                .or_else(|| parts.decoded_userinfo()),
        },
        transport: Network::Tcp,
        transport_settings: TransportSettings::Hysteria(settings),
        security: Security::Tls(TlsSettings {
            sni: query.get_string(&["peer", "sni"]),
            alpn: query.list(&["alpn"]),
            fingerprint: None,
            allow_insecure: query.flag(&["insecure", "allowInsecure"]),
        }),
        remark: parts.remark,
    };
    node.validate()?;
    Ok(node)
}
