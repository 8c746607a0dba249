use crate::error::Result;
use crate::generator::schema::{schema, Schema};
use crate::models::{
    CoreType, Identity, Network, NodeInfo, OrderedMap, Scheme, Security, TransportSettings,
};

use super::{host_header, set_block, unsupported};

/// mihomo takes bare interface addresses, split by family.
fn interface_addresses(addresses: &[String]) -> (Option<String>, Option<String>) {
    let bare = |a: &String| a.split('/').next().unwrap_or_default().to_string();
    let v4 = addresses.iter().find(|a| !a.contains(':')).map(bare);
    let v6 = addresses.iter().find(|a| a.contains(':')).map(bare);
    (v4, v6)
}

fn set_identity(outbound: &mut OrderedMap, node: &NodeInfo) {
    match &node.identity {
        Identity::Socks { username, password } => {
            outbound.set_opt("username", username.as_deref());
            outbound.set_opt("password", password.as_deref());
        }
        Identity::Shadowsocks { method, password } => {
            outbound.set("cipher", method);
            outbound.set("password", password);
        }
        Identity::VMess {
            id,
            alter_id,
            security,
        } => {
            outbound.set("uuid", id);
            outbound.set("alterId", *alter_id);
            outbound.set("cipher", security);
        }
        Identity::Vless { id, flow } => {
            outbound.set("uuid", id);
            outbound.set_opt("flow", flow.as_deref());
        }
        Identity::Trojan { password } => outbound.set("password", password),
        Identity::Hysteria { auth } => {
            outbound.set_opt("auth-str", auth.as_deref());
            if let TransportSettings::Hysteria(hy) = &node.transport_settings {
                outbound.set_opt("protocol", hy.protocol.as_deref());
                outbound.set("up", hy.up_mbps);
                outbound.set("down", hy.down_mbps);
                outbound.set_opt("obfs", hy.obfs.as_deref());
                outbound.set_opt("recv-window-conn", hy.recv_window_conn);
                outbound.set_opt("recv-window", hy.recv_window);
                if hy.disable_mtu_discovery {
                    outbound.set("disable_mtu_discovery", true);
                }
            }
        }
        Identity::Hysteria2 { password } => {
            outbound.set_opt("password", password.as_deref());
            if let TransportSettings::Hysteria2(hy2) = &node.transport_settings {
                outbound.set_opt("ports", hy2.ports.as_deref());
                outbound.set_opt("up", hy2.up_mbps);
                outbound.set_opt("down", hy2.down_mbps);
                outbound.set_opt("obfs", hy2.obfs.as_deref());
                outbound.set_opt("obfs-password", hy2.obfs_password.as_deref());
            }
        }
        Identity::WireGuard {
            secret_key,
            local_address,
            peer_public_key,
        } => {
            let (ip, ipv6) = interface_addresses(local_address);
            outbound.set_opt("ip", ip);
            outbound.set_opt("ipv6", ipv6);
            outbound.set("private-key", secret_key);
            outbound.set("public-key", peer_public_key);
            if let TransportSettings::WireGuard(wg) = &node.transport_settings {
                outbound.set_opt("pre-shared-key", wg.pre_shared_key.as_deref());
                outbound.set_opt("reserved", wg.reserved.clone());
                outbound.set_opt("mtu", wg.mtu);
            }
            outbound.set("udp", true);
        }
    }
}

fn set_stream(outbound: &mut OrderedMap, node: &NodeInfo, names: &Schema) -> Result<()> {
    match &node.transport_settings {
        TransportSettings::Tcp {
            header_type,
            host,
            path,
        } => {
            if header_type.as_deref() == Some("http") {
                outbound.set(names.network, "http");
                let mut opts = OrderedMap::new();
                opts.set("method", "GET");
                opts.set("path", vec![path.as_deref().unwrap_or("/")]);
                if let Some(host) = host {
                    opts.set("headers", host_header(vec![host.as_str()]));
                }
                outbound.set("http-opts", opts);
            }
        }
        TransportSettings::Ws { path, host } | TransportSettings::HttpUpgrade { path, host } => {
            outbound.set(names.network, "ws");
            let mut opts = OrderedMap::new();
            opts.set_opt("path", path.as_deref());
            if let Some(host) = host {
                opts.set("headers", host_header(host.as_str()));
            }
            if node.transport_settings.network() == Network::HttpUpgrade {
                opts.set("v2ray-http-upgrade", true);
            }
            set_block(outbound, "ws-opts", opts);
        }
        TransportSettings::Grpc { service_name, .. } => {
            outbound.set(names.network, "grpc");
            let mut opts = OrderedMap::new();
            opts.set_opt(names.service_name, service_name.as_deref());
            set_block(outbound, "grpc-opts", opts);
        }
        TransportSettings::H2 { path, host } => {
            outbound.set(names.network, "h2");
            let mut opts = OrderedMap::new();
            if !host.is_empty() {
                opts.set("host", host.clone());
            }
            opts.set_opt("path", path.as_deref());
            set_block(outbound, "h2-opts", opts);
        }
        TransportSettings::Kcp { .. } | TransportSettings::Quic { .. } => {
            return Err(unsupported(node, CoreType::Mihomo));
        }
        TransportSettings::Hysteria(_)
        | TransportSettings::Hysteria2(_)
        | TransportSettings::WireGuard(_) => {}
    }
    Ok(())
}

fn set_security(outbound: &mut OrderedMap, node: &NodeInfo, names: &Schema) {
    let Some(tls) = node.security.tls_settings() else {
        return;
    };
    // trojan and the hysteria family are always TLS and call the name `sni`
    let implicit_tls = matches!(
        node.scheme,
        Scheme::Trojan | Scheme::Hysteria | Scheme::Hysteria2
    );
    if !implicit_tls {
        outbound.set("tls", true);
    }
    let server_name = if implicit_tls { "sni" } else { names.server_name };
    outbound.set_opt(server_name, tls.sni.as_deref());
    if !tls.alpn.is_empty() {
        outbound.set(names.alpn, tls.alpn.clone());
    }
    outbound.set_opt(names.fingerprint, tls.fingerprint.as_deref());
    if tls.allow_insecure {
        outbound.set(names.insecure, true);
    }
    if let Security::Reality(reality) = &node.security {
        let mut opts = OrderedMap::new();
        opts.set(names.public_key, reality.public_key.as_str());
        opts.set_opt(names.short_id, reality.short_id.as_deref());
        outbound.set("reality-opts", opts);
    }
}

/// Proxy entry in the mihomo (clash.meta) dialect; the tag becomes `name`.
pub(crate) fn to_outbound(node: &NodeInfo, protocol: &str, tag: &str) -> Result<OrderedMap> {
    let names = schema(CoreType::Mihomo);
    let mut outbound = OrderedMap::new();
    outbound.set(names.protocol, protocol);
    outbound.set(names.address, node.address.as_str());
    outbound.set(names.port, node.port);
    set_identity(&mut outbound, node);
    set_stream(&mut outbound, node, names)?;
    set_security(&mut outbound, node, names);
    outbound.set(names.tag, tag);
    Ok(outbound)
}
