//! Canonical node description
//!
//! Every scheme parser produces a [`NodeInfo`]; the outbound generators only
//! ever read from it. Scheme-specific data lives in closed enums so a node
//! cannot carry credentials or transport keys that do not belong to it.

use std::fmt;

use crate::error::{MalformedReason, Result, ShareLinkError};

/// Protocol of a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Socks,
    Shadowsocks,
    VMess,
    Vless,
    Trojan,
    Hysteria,
    Hysteria2,
    WireGuard,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Socks => "socks",
            Scheme::Shadowsocks => "shadowsocks",
            Scheme::VMess => "vmess",
            Scheme::Vless => "vless",
            Scheme::Trojan => "trojan",
            Scheme::Hysteria => "hysteria",
            Scheme::Hysteria2 => "hysteria2",
            Scheme::WireGuard => "wireguard",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential payload, one variant per scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Socks {
        username: Option<String>,
        password: Option<String>,
    },
    Shadowsocks {
        method: String,
        password: String,
    },
    VMess {
        id: String,
        alter_id: u16,
        /// Cipher requested by the client, `auto` when the link names none.
        security: String,
    },
    Vless {
        id: String,
        flow: Option<String>,
    },
    Trojan {
        password: String,
    },
    Hysteria {
        auth: Option<String>,
    },
    Hysteria2 {
        password: Option<String>,
    },
    WireGuard {
        secret_key: String,
        /// Interface addresses in CIDR or bare form, IPv4 first as given.
        local_address: Vec<String>,
        peer_public_key: String,
    },
}

impl Identity {
    pub fn scheme(&self) -> Scheme {
        match self {
            Identity::Socks { .. } => Scheme::Socks,
            Identity::Shadowsocks { .. } => Scheme::Shadowsocks,
            Identity::VMess { .. } => Scheme::VMess,
            Identity::Vless { .. } => Scheme::Vless,
            Identity::Trojan { .. } => Scheme::Trojan,
            Identity::Hysteria { .. } => Scheme::Hysteria,
            Identity::Hysteria2 { .. } => Scheme::Hysteria2,
            Identity::WireGuard { .. } => Scheme::WireGuard,
        }
    }

    fn check_required(&self) -> Result<()> {
        let scheme = self.scheme();
        let require = |value: &str, field: &'static str| {
            if value.is_empty() {
                Err(ShareLinkError::missing(scheme, field))
            } else {
                Ok(())
            }
        };
        match self {
            Identity::Shadowsocks { method, password } => {
                require(method, "method")?;
                require(password, "password")
            }
            Identity::VMess { id, .. } | Identity::Vless { id, .. } => require(id, "id"),
            Identity::Trojan { password } => require(password, "password"),
            Identity::WireGuard {
                secret_key,
                local_address,
                peer_public_key,
            } => {
                require(secret_key, "privateKey")?;
                require(peer_public_key, "publicKey")?;
                if local_address.iter().all(|a| a.is_empty()) {
                    return Err(ShareLinkError::missing(scheme, "address"));
                }
                Ok(())
            }
            Identity::Socks { .. } | Identity::Hysteria { .. } | Identity::Hysteria2 { .. } => {
                Ok(())
            }
        }
    }
}

/// Stream carrier beneath the proxy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Tcp,
    Ws,
    Grpc,
    HttpUpgrade,
    Kcp,
    Quic,
    H2,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Ws => "ws",
            Network::Grpc => "grpc",
            Network::HttpUpgrade => "httpupgrade",
            Network::Kcp => "kcp",
            Network::Quic => "quic",
            Network::H2 => "h2",
        }
    }

    /// Maps the transport names used by share links, including the common
    /// aliases, to a [`Network`].
    pub fn from_name(name: &str) -> Option<Network> {
        match name.to_ascii_lowercase().as_str() {
            "" | "tcp" | "raw" => Some(Network::Tcp),
            "ws" | "websocket" => Some(Network::Ws),
            "grpc" | "gun" => Some(Network::Grpc),
            "httpupgrade" => Some(Network::HttpUpgrade),
            "kcp" | "mkcp" => Some(Network::Kcp),
            "quic" => Some(Network::Quic),
            "h2" | "http" => Some(Network::H2),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hysteria (v1) tuning carried by the link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HysteriaSettings {
    /// `udp`, `faketcp` or `wechat-video`.
    pub protocol: Option<String>,
    pub up_mbps: u32,
    pub down_mbps: u32,
    pub obfs: Option<String>,
    pub recv_window_conn: Option<u32>,
    pub recv_window: Option<u32>,
    pub disable_mtu_discovery: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hysteria2Settings {
    pub up_mbps: Option<u32>,
    pub down_mbps: Option<u32>,
    pub obfs: Option<String>,
    pub obfs_password: Option<String>,
    /// Port-hopping range such as `20000-30000` or `443,5000-6000`.
    pub ports: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireGuardSettings {
    pub mtu: Option<u32>,
    pub reserved: Option<Vec<u8>>,
    pub pre_shared_key: Option<String>,
}

/// Transport-specific keys. Each variant only holds the keys its transport
/// understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSettings {
    Tcp {
        /// `http` enables the HTTP header obfuscation, which uses host/path.
        header_type: Option<String>,
        host: Option<String>,
        path: Option<String>,
    },
    Ws {
        path: Option<String>,
        host: Option<String>,
    },
    HttpUpgrade {
        path: Option<String>,
        host: Option<String>,
    },
    Grpc {
        service_name: Option<String>,
        multi_mode: bool,
    },
    Kcp {
        header_type: Option<String>,
        seed: Option<String>,
    },
    Quic {
        security: Option<String>,
        key: Option<String>,
        header_type: Option<String>,
    },
    H2 {
        path: Option<String>,
        host: Vec<String>,
    },
    Hysteria(HysteriaSettings),
    Hysteria2(Hysteria2Settings),
    WireGuard(WireGuardSettings),
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings::Tcp {
            header_type: None,
            host: None,
            path: None,
        }
    }
}

impl TransportSettings {
    /// Transport these settings belong to. Protocol-native settings ride on
    /// links without a stream transport, which report the default `tcp`.
    pub fn network(&self) -> Network {
        match self {
            TransportSettings::Tcp { .. } => Network::Tcp,
            TransportSettings::Ws { .. } => Network::Ws,
            TransportSettings::HttpUpgrade { .. } => Network::HttpUpgrade,
            TransportSettings::Grpc { .. } => Network::Grpc,
            TransportSettings::Kcp { .. } => Network::Kcp,
            TransportSettings::Quic { .. } => Network::Quic,
            TransportSettings::H2 { .. } => Network::H2,
            TransportSettings::Hysteria(_)
            | TransportSettings::Hysteria2(_)
            | TransportSettings::WireGuard(_) => Network::Tcp,
        }
    }

    fn native_scheme(&self) -> Option<Scheme> {
        match self {
            TransportSettings::Hysteria(_) => Some(Scheme::Hysteria),
            TransportSettings::Hysteria2(_) => Some(Scheme::Hysteria2),
            TransportSettings::WireGuard(_) => Some(Scheme::WireGuard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TlsSettings {
    pub sni: Option<String>,
    pub alpn: Vec<String>,
    pub fingerprint: Option<String>,
    pub allow_insecure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RealitySettings {
    pub tls: TlsSettings,
    pub public_key: String,
    pub short_id: Option<String>,
    pub spider_x: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Security {
    #[default]
    None,
    Tls(TlsSettings),
    Reality(RealitySettings),
}

impl Security {
    pub fn as_str(&self) -> &'static str {
        match self {
            Security::None => "none",
            Security::Tls(_) => "tls",
            Security::Reality(_) => "reality",
        }
    }

    pub fn tls_settings(&self) -> Option<&TlsSettings> {
        match self {
            Security::None => None,
            Security::Tls(tls) => Some(tls),
            Security::Reality(reality) => Some(&reality.tls),
        }
    }
}

/// A decoded proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub scheme: Scheme,
    pub address: String,
    pub port: u16,
    pub identity: Identity,
    pub transport: Network,
    pub transport_settings: TransportSettings,
    pub security: Security,
    pub remark: String,
}

impl NodeInfo {
    /// Checks the invariants every node must satisfy before it leaves a
    /// parser or enters a generator.
    ///
    /// Fields are public, so a node built or edited by hand may break these
    /// invariants; the outbound builder runs this again before emitting
    /// anything.
    pub fn validate(&self) -> Result<()> {
        let scheme = self.scheme;
        if self.address.trim().is_empty() || self.port == 0 {
            return Err(ShareLinkError::malformed(scheme, MalformedReason::Address));
        }
        if self.identity.scheme() != scheme {
            return Err(ShareLinkError::malformed(
                scheme,
                MalformedReason::Parameter("identity"),
            ));
        }
        self.identity.check_required()?;

        if self.transport_settings.network() != self.transport {
            return Err(ShareLinkError::malformed(
                scheme,
                MalformedReason::Parameter("type"),
            ));
        }
        let native_expected = matches!(
            scheme,
            Scheme::Hysteria | Scheme::Hysteria2 | Scheme::WireGuard
        );
        match self.transport_settings.native_scheme() {
            Some(owner) if owner != scheme => {
                return Err(ShareLinkError::malformed(
                    scheme,
                    MalformedReason::Parameter("type"),
                ))
            }
            None if native_expected => {
                return Err(ShareLinkError::malformed(
                    scheme,
                    MalformedReason::Parameter("type"),
                ))
            }
            _ => {}
        }

        if let Security::Reality(reality) = &self.security {
            if reality.public_key.is_empty() {
                return Err(ShareLinkError::missing(scheme, "publicKey"));
            }
        }
        Ok(())
    }

    /// `host:port`, with IPv6 hosts bracketed.
    pub fn endpoint(&self) -> String {
        if self.address.contains(':') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    /// Protocol name to hand to a latency probe for this node.
    pub fn probe_protocol(&self) -> &'static str {
        match self.scheme {
            Scheme::Hysteria | Scheme::Hysteria2 | Scheme::WireGuard => "udp",
            _ => self.transport.as_str(),
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}/{}",
            self.scheme,
            self.remark,
            self.endpoint(),
            self.transport,
            self.security.as_str()
        )
    }
}
