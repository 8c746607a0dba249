use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use log::{debug, trace};

/// Returned by [`ping`] when the target did not answer.
pub const PING_FAILED: i64 = -1;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// QUIC packet with an unsupported version, so any server replies with a
/// version negotiation packet.
const QUIC_PROBE: &[u8] = b"\r12345678Q999\x00";

/// DNS header with RD set and no questions.
const DNS_PROBE: &[u8] = b"\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00\x00\x00";

fn resolve(host: &str, port: u16) -> Option<Vec<SocketAddr>> {
    match (host, port).to_socket_addrs() {
        Ok(addrs) => Some(addrs.collect()),
        Err(e) => {
            debug!("cannot resolve {}: {}", host, e);
            None
        }
    }
}

fn tcp_connect(addrs: &[SocketAddr]) -> bool {
    addrs
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, PROBE_TIMEOUT).is_ok())
}

fn udp_connect(addr: &SocketAddr) -> Option<UdpSocket> {
    let local = if addr.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
    let socket = UdpSocket::bind(local).ok()?;
    socket.connect(addr).ok()?;
    socket.set_read_timeout(Some(PROBE_TIMEOUT)).ok()?;
    socket.set_write_timeout(Some(PROBE_TIMEOUT)).ok()?;
    Some(socket)
}

/// Sends `probe` and waits for any datagram in reply.
fn udp_exchange(addrs: &[SocketAddr], probe: &[u8]) -> bool {
    addrs.iter().filter_map(udp_connect).any(|socket| {
        let mut buf = [0u8; 1024];
        socket.send(probe).is_ok() && socket.recv(&mut buf).is_ok()
    })
}

/// Probe `host:port` with `protocol` and return the elapsed milliseconds, or
/// [`PING_FAILED`]
///
/// Stream transports (`tcp`, `http`, `h2`, `httpupgrade`, `ws`, `grpc`) are
/// timed by a TCP connect. `udp`, `kcp` and `mkcp` only open a UDP socket,
/// while `quic` and `dns` send a probe and wait for the reply. Every step
/// gives up after two seconds.
pub fn ping(protocol: &str, host: &str, port: u16) -> i64 {
    let start = Instant::now();
    let Some(addrs) = resolve(host, port) else {
        return PING_FAILED;
    };

    let reached = match protocol.to_ascii_lowercase().as_str() {
        "tcp" | "http" | "h2" | "httpupgrade" | "ws" | "grpc" => tcp_connect(&addrs),
        "udp" | "kcp" | "mkcp" => addrs.iter().any(|addr| udp_connect(addr).is_some()),
        "quic" => udp_exchange(&addrs, QUIC_PROBE),
        "dns" => udp_exchange(&addrs, DNS_PROBE),
        other => {
            debug!("no probe for protocol {}", other);
            false
        }
    };
    if !reached {
        return PING_FAILED;
    }

    let elapsed = start.elapsed().as_millis() as i64;
    trace!("{} {}:{} answered in {}ms", protocol, host, port, elapsed);
    elapsed
}
