use crate::error::Result;
use crate::generator::schema::{schema, Schema};
use crate::models::{
    CoreType, Identity, NodeInfo, OrderedMap, Security, TlsSettings, TransportSettings,
};

use super::{host_header, set_block, unsupported};

/// sing-box only takes ranges, written `start:end`.
fn server_ports(ports: &str) -> Vec<String> {
    ports
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('-') {
            Some((start, end)) => format!("{}:{}", start, end),
            None => format!("{}:{}", p, p),
        })
        .collect()
}

fn set_identity(outbound: &mut OrderedMap, node: &NodeInfo) {
    match &node.identity {
        Identity::Socks { username, password } => {
            outbound.set("version", "5");
            outbound.set_opt("username", username.as_deref());
            outbound.set_opt("password", password.as_deref());
        }
        Identity::Shadowsocks { method, password } => {
            outbound.set("method", method);
            outbound.set("password", password);
        }
        Identity::VMess {
            id,
            alter_id,
            security,
        } => {
            outbound.set("uuid", id);
            outbound.set("security", security);
            outbound.set("alter_id", *alter_id);
        }
        Identity::Vless { id, flow } => {
            outbound.set("uuid", id);
            outbound.set_opt("flow", flow.as_deref());
        }
        Identity::Trojan { password } => outbound.set("password", password),
        Identity::Hysteria { auth } => {
            if let TransportSettings::Hysteria(hy) = &node.transport_settings {
                outbound.set("up_mbps", hy.up_mbps);
                outbound.set("down_mbps", hy.down_mbps);
                outbound.set_opt("obfs", hy.obfs.as_deref());
                outbound.set_opt("auth_str", auth.as_deref());
                outbound.set_opt("recv_window_conn", hy.recv_window_conn);
                outbound.set_opt("recv_window", hy.recv_window);
                if hy.disable_mtu_discovery {
                    outbound.set("disable_mtu_discovery", true);
                }
            }
        }
        Identity::Hysteria2 { password } => {
            if let TransportSettings::Hysteria2(hy2) = &node.transport_settings {
                if let Some(ports) = &hy2.ports {
                    outbound.set("server_ports", server_ports(ports));
                }
                outbound.set_opt("up_mbps", hy2.up_mbps);
                outbound.set_opt("down_mbps", hy2.down_mbps);
                if let Some(obfs) = &hy2.obfs {
                    let mut block = OrderedMap::new();
                    block.set("type", obfs);
                    block.set_opt("password", hy2.obfs_password.as_deref());
                    outbound.set("obfs", block);
                }
            }
            outbound.set_opt("password", password.as_deref());
        }
        Identity::WireGuard {
            secret_key,
            local_address,
            peer_public_key,
        } => {
            outbound.set("local_address", local_address.clone());
            outbound.set("private_key", secret_key);
            outbound.set("peer_public_key", peer_public_key);
            if let TransportSettings::WireGuard(wg) = &node.transport_settings {
                outbound.set_opt("pre_shared_key", wg.pre_shared_key.as_deref());
                outbound.set_opt("reserved", wg.reserved.clone());
                outbound.set_opt("mtu", wg.mtu);
            }
        }
    }
}

fn transport(node: &NodeInfo, names: &Schema) -> Result<OrderedMap> {
    let mut block = OrderedMap::new();
    match &node.transport_settings {
        TransportSettings::Tcp {
            header_type,
            host,
            path,
        } => {
            // plain HTTP camouflage is sing-box's http transport without TLS
            if header_type.as_deref() == Some("http") {
                block.set(names.network, "http");
                if let Some(host) = host {
                    block.set("host", vec![host.as_str()]);
                }
                block.set_opt("path", path.as_deref());
            }
        }
        TransportSettings::Ws { path, host } => {
            block.set(names.network, "ws");
            block.set_opt("path", path.as_deref());
            if let Some(host) = host {
                block.set("headers", host_header(host.as_str()));
            }
        }
        TransportSettings::HttpUpgrade { path, host } => {
            block.set(names.network, "httpupgrade");
            block.set_opt("host", host.as_deref());
            block.set_opt("path", path.as_deref());
        }
        TransportSettings::Grpc { service_name, .. } => {
            block.set(names.network, "grpc");
            block.set_opt(names.service_name, service_name.as_deref());
        }
        TransportSettings::H2 { path, host } => {
            block.set(names.network, "http");
            if !host.is_empty() {
                block.set("host", host.clone());
            }
            block.set_opt("path", path.as_deref());
        }
        TransportSettings::Quic { .. } => block.set(names.network, "quic"),
        TransportSettings::Kcp { .. } => return Err(unsupported(node, CoreType::SingBox)),
        TransportSettings::Hysteria(_)
        | TransportSettings::Hysteria2(_)
        | TransportSettings::WireGuard(_) => {}
    }
    Ok(block)
}

fn tls_fields(block: &mut OrderedMap, tls: &TlsSettings, names: &Schema) {
    block.set("enabled", true);
    block.set_opt(names.server_name, tls.sni.as_deref());
    if tls.allow_insecure {
        block.set(names.insecure, true);
    }
    if !tls.alpn.is_empty() {
        block.set(names.alpn, tls.alpn.clone());
    }
    if let Some(fingerprint) = &tls.fingerprint {
        let mut utls = OrderedMap::new();
        utls.set("enabled", true);
        utls.set(names.fingerprint, fingerprint);
        block.set("utls", utls);
    }
}

fn tls(security: &Security, names: &Schema) -> OrderedMap {
    let mut block = OrderedMap::new();
    match security {
        Security::None => {}
        Security::Tls(tls) => tls_fields(&mut block, tls, names),
        Security::Reality(reality) => {
            tls_fields(&mut block, &reality.tls, names);
            let mut inner = OrderedMap::new();
            inner.set("enabled", true);
            inner.set(names.public_key, reality.public_key.as_str());
            inner.set_opt(names.short_id, reality.short_id.as_deref());
            block.set("reality", inner);
        }
    }
    block
}

/// Outbound object in the sing-box dialect.
pub(crate) fn to_outbound(node: &NodeInfo, protocol: &str, tag: &str) -> Result<OrderedMap> {
    let names = schema(CoreType::SingBox);
    let mut outbound = OrderedMap::new();
    outbound.set(names.protocol, protocol);
    outbound.set(names.address, node.address.as_str());
    outbound.set(names.port, node.port);
    set_identity(&mut outbound, node);
    set_block(&mut outbound, "transport", transport(node, names)?);
    set_block(&mut outbound, "tls", tls(&node.security, names));
    outbound.set(names.tag, tag);
    Ok(outbound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShareLinkError;
    use crate::models::Scheme;
    use crate::parser::explode;

    #[test]
    fn test_vmess_ws_outbound() {
        let node = explode("vmess://eyJhZGQiOiJhLmNvbSIsInBvcnQiOiI0NDMiLCJpZCI6InV1aWQiLCJuZXQiOiJ3cyIsImhvc3QiOiJjZG4uY29tIiwicGF0aCI6Ii93cyIsInRscyI6InRscyIsInNuaSI6ImEuY29tIiwicHMiOiJWTSJ9").unwrap();
        let outbound = to_outbound(&node, "vmess", "proxy").unwrap();
        assert_eq!(
            outbound.to_json_string().unwrap(),
            concat!(
                r#"{"type":"vmess","server":"a.com","server_port":443,"uuid":"uuid","security":"auto","alter_id":0,"#,
                r#""transport":{"type":"ws","path":"/ws","headers":{"Host":"cdn.com"}},"#,
                r#""tls":{"enabled":true,"server_name":"a.com"},"tag":"proxy"}"#
            )
        );
    }

    #[test]
    fn test_hysteria2_outbound() {
        let node = explode(
            "hy2://pw@1.2.3.4:443,20000-30000/?obfs=salamander&obfs-password=x&sni=a.com&insecure=1&up=10",
        )
        .unwrap();
        let outbound = to_outbound(&node, "hysteria2", "hy").unwrap();
        assert_eq!(
            outbound.to_json_string().unwrap(),
            concat!(
                r#"{"type":"hysteria2","server":"1.2.3.4","server_port":443,"#,
                r#""server_ports":["443:443","20000:30000"],"up_mbps":10,"#,
                r#""obfs":{"type":"salamander","password":"x"},"password":"pw","#,
                r#""tls":{"enabled":true,"server_name":"a.com","insecure":true},"tag":"hy"}"#
            )
        );
    }

    #[test]
    fn test_kcp_is_unsupported() {
        let node = explode("vless://id@a.com:443?type=kcp&security=none").unwrap();
        assert_eq!(
            to_outbound(&node, "vless", "proxy"),
            Err(ShareLinkError::UnsupportedCore {
                core: CoreType::SingBox,
                scheme: Scheme::Vless
            })
        );
    }
}
