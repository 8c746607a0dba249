pub mod common;
pub mod hysteria;
pub mod hysteria2;
pub(crate) mod link;
pub mod socks;
pub mod ss;
pub(crate) mod stream;
pub mod trojan;
pub mod vless;
pub mod vmess;
pub mod wireguard;

pub use common::{detect_scheme, explode, explode_sub};
