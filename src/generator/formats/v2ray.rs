use crate::error::Result;
use crate::generator::schema::{schema, Schema};
use crate::models::{
    CoreType, Identity, NodeInfo, OrderedMap, Security, TlsSettings, TransportSettings,
};

use super::{host_header, set_block, unsupported};

/// `address`/`port` entry of a `servers` or `vnext` list.
fn server_entry(node: &NodeInfo, names: &Schema) -> OrderedMap {
    let mut server = OrderedMap::new();
    server.set(names.address, node.address.as_str());
    server.set(names.port, node.port);
    server
}

fn settings(node: &NodeInfo, core: CoreType, names: &Schema) -> Result<OrderedMap> {
    let mut settings = OrderedMap::new();
    let mut server = server_entry(node, names);
    match &node.identity {
        Identity::Socks { username, password } => {
            if username.is_some() || password.is_some() {
                let mut user = OrderedMap::new();
                user.set("user", username.as_deref().unwrap_or_default());
                user.set_opt("pass", password.as_deref());
                server.set("users", vec![user]);
            }
            settings.set("servers", vec![server]);
        }
        Identity::Shadowsocks { method, password } => {
            server.set("method", method);
            server.set("password", password);
            settings.set("servers", vec![server]);
        }
        Identity::Trojan { password } => {
            server.set("password", password);
            settings.set("servers", vec![server]);
        }
        Identity::VMess {
            id,
            alter_id,
            security,
        } => {
            let mut user = OrderedMap::new();
            user.set("id", id);
            user.set("alterId", *alter_id);
            user.set("security", security);
            server.set("users", vec![user]);
            settings.set("vnext", vec![server]);
        }
        Identity::Vless { id, flow } => {
            let mut user = OrderedMap::new();
            user.set("id", id);
            user.set("encryption", "none");
            user.set_opt("flow", flow.as_deref());
            server.set("users", vec![user]);
            settings.set("vnext", vec![server]);
        }
        Identity::WireGuard {
            secret_key,
            local_address,
            peer_public_key,
        } => {
            settings.set("secretKey", secret_key);
            settings.set("address", local_address.clone());
            let mut peer = OrderedMap::new();
            peer.set("endpoint", node.endpoint());
            peer.set("publicKey", peer_public_key);
            if let TransportSettings::WireGuard(wg) = &node.transport_settings {
                peer.set_opt("preSharedKey", wg.pre_shared_key.as_deref());
                settings.set("peers", vec![peer]);
                settings.set_opt("mtu", wg.mtu);
                settings.set_opt("reserved", wg.reserved.clone());
            } else {
                settings.set("peers", vec![peer]);
            }
        }
        Identity::Hysteria { .. } | Identity::Hysteria2 { .. } => {
            return Err(unsupported(node, core));
        }
    }
    Ok(settings)
}

fn transport_block(settings: &TransportSettings, names: &Schema) -> Option<(&'static str, OrderedMap)> {
    let mut block = OrderedMap::new();
    let key = match settings {
        TransportSettings::Tcp {
            header_type,
            host,
            path,
        } => {
            let header_type = header_type.as_deref()?;
            let mut header = OrderedMap::new();
            header.set("type", header_type);
            if header_type == "http" {
                let mut request = OrderedMap::new();
                request.set("path", vec![path.as_deref().unwrap_or("/")]);
                if let Some(host) = host {
                    request.set("headers", host_header(vec![host.as_str()]));
                }
                header.set("request", request);
            }
            block.set("header", header);
            "tcpSettings"
        }
        TransportSettings::Ws { path, host } => {
            block.set_opt("path", path.as_deref());
            if let Some(host) = host {
                block.set("headers", host_header(host.as_str()));
            }
            "wsSettings"
        }
        TransportSettings::HttpUpgrade { path, host } => {
            block.set_opt("path", path.as_deref());
            block.set_opt("host", host.as_deref());
            "httpupgradeSettings"
        }
        TransportSettings::Grpc {
            service_name,
            multi_mode,
        } => {
            block.set_opt(names.service_name, service_name.as_deref());
            if *multi_mode {
                block.set("multiMode", true);
            }
            "grpcSettings"
        }
        TransportSettings::Kcp { header_type, seed } => {
            if let Some(header_type) = header_type {
                let mut header = OrderedMap::new();
                header.set("type", header_type);
                block.set("header", header);
            }
            block.set_opt("seed", seed.as_deref());
            "kcpSettings"
        }
        TransportSettings::Quic {
            security,
            key,
            header_type,
        } => {
            block.set_opt("security", security.as_deref());
            block.set_opt("key", key.as_deref());
            if let Some(header_type) = header_type {
                let mut header = OrderedMap::new();
                header.set("type", header_type);
                block.set("header", header);
            }
            "quicSettings"
        }
        TransportSettings::H2 { path, host } => {
            block.set_opt("path", path.as_deref());
            if !host.is_empty() {
                block.set("host", host.clone());
            }
            "httpSettings"
        }
        TransportSettings::Hysteria(_)
        | TransportSettings::Hysteria2(_)
        | TransportSettings::WireGuard(_) => return None,
    };
    Some((key, block))
}

fn tls_block(tls: &TlsSettings, names: &Schema) -> OrderedMap {
    let mut block = OrderedMap::new();
    block.set_opt(names.server_name, tls.sni.as_deref());
    if !tls.alpn.is_empty() {
        block.set(names.alpn, tls.alpn.clone());
    }
    block.set_opt(names.fingerprint, tls.fingerprint.as_deref());
    if tls.allow_insecure {
        block.set(names.insecure, true);
    }
    block
}

fn stream_settings(node: &NodeInfo, names: &Schema) -> OrderedMap {
    let mut stream = OrderedMap::new();
    stream.set(names.network, node.transport.as_str());
    if let Some((key, block)) = transport_block(&node.transport_settings, names) {
        set_block(&mut stream, key, block);
    }

    match &node.security {
        Security::None => {}
        Security::Tls(tls) => {
            stream.set("security", "tls");
            set_block(&mut stream, "tlsSettings", tls_block(tls, names));
        }
        Security::Reality(reality) => {
            stream.set("security", "reality");
            let mut block = OrderedMap::new();
            block.set_opt(names.server_name, reality.tls.sni.as_deref());
            block.set_opt(names.fingerprint, reality.tls.fingerprint.as_deref());
            block.set(names.public_key, reality.public_key.as_str());
            block.set_opt(names.short_id, reality.short_id.as_deref());
            block.set_opt("spiderX", reality.spider_x.as_deref());
            stream.set("realitySettings", block);
        }
    }
    stream
}

/// Outbound object in the xray / v2ray dialect.
pub(crate) fn to_outbound(
    node: &NodeInfo,
    core: CoreType,
    protocol: &str,
    tag: &str,
) -> Result<OrderedMap> {
    let names = schema(core);
    let mut outbound = OrderedMap::new();
    outbound.set(names.protocol, protocol);
    outbound.set("settings", settings(node, core, names)?);
    // wireguard is its own transport
    if !matches!(node.identity, Identity::WireGuard { .. }) {
        outbound.set("streamSettings", stream_settings(node, names));
    }
    outbound.set(names.tag, tag);
    Ok(outbound)
}
