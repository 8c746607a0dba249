//! One module per outbound dialect. xray and v2ray share a dialect and
//! differ only in their schema table.

pub(crate) mod mihomo;
pub(crate) mod singbox;
pub(crate) mod v2ray;

use crate::error::ShareLinkError;
use crate::models::{CoreType, NodeInfo, OrderedMap, Value};

/// `{"Host": host}`, the header block ws and http camouflage share.
pub(super) fn host_header<V: Into<Value>>(host: V) -> OrderedMap {
    let mut headers = OrderedMap::new();
    headers.set("Host", host);
    headers
}

/// The node uses a transport `core` has no counterpart for.
pub(super) fn unsupported(node: &NodeInfo, core: CoreType) -> ShareLinkError {
    ShareLinkError::UnsupportedCore {
        core,
        scheme: node.scheme,
    }
}

/// Stores `block` under `key` unless it ended up empty.
pub(super) fn set_block(target: &mut OrderedMap, key: &str, block: OrderedMap) {
    if !block.is_empty() {
        target.set(key, block);
    }
}
