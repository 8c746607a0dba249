//! Outbound generation
//!
//! Turns a [`NodeInfo`] into the outbound object of one proxy core. Every
//! outbound is written in the same semantic order (server and identity,
//! stream settings, security, tag) whatever the core, so the serialized
//! text is stable across runs.

pub(crate) mod formats;
pub(crate) mod schema;

use log::trace;

use crate::error::{Result, ShareLinkError};
use crate::models::{CoreType, NodeInfo, OrderedMap, Security, Value};

/// Cross-checks that only matter when emitting an outbound.
fn check_buildable(node: &NodeInfo, core: CoreType) -> Result<&'static str> {
    node.validate()?;
    if let Security::Reality(reality) = &node.security {
        if reality.short_id.as_deref().unwrap_or_default().is_empty() {
            return Err(ShareLinkError::missing(node.scheme, "shortId"));
        }
    }

    let unsupported = || ShareLinkError::UnsupportedCore {
        core,
        scheme: node.scheme,
    };
    let protocol = schema::protocol_name(core, node.scheme).ok_or_else(unsupported)?;
    if matches!(node.security, Security::Reality(_)) && !schema::schema(core).reality {
        return Err(unsupported());
    }
    Ok(protocol)
}

/// Build the outbound object of `node` for `core`, tagged with `tag`
///
/// Fails when the node breaks an invariant, when REALITY lacks its public
/// key or short id, or when `core` cannot represent the node.
pub fn to_outbound_with_tag(node: &NodeInfo, core: CoreType, tag: &str) -> Result<OrderedMap> {
    let protocol = check_buildable(node, core)?;
    let outbound = match core {
        CoreType::Xray | CoreType::V2ray => formats::v2ray::to_outbound(node, core, protocol, tag)?,
        CoreType::SingBox => formats::singbox::to_outbound(node, protocol, tag)?,
        CoreType::Mihomo => formats::mihomo::to_outbound(node, protocol, tag)?,
    };
    trace!("{} outbound for {} has {} keys", core, node.endpoint(), outbound.len());
    Ok(outbound)
}

impl NodeInfo {
    /// See [`to_outbound_with_tag`].
    pub fn to_outbound_with_tag(&self, core: CoreType, tag: &str) -> Result<OrderedMap> {
        to_outbound_with_tag(self, core, tag)
    }
}

/// Tag of the `index`-th node of a document: `prefix`, `prefix-1`, ...
pub fn nth_tag(prefix: &str, index: usize) -> String {
    if index == 0 {
        prefix.to_string()
    } else {
        format!("{}-{}", prefix, index)
    }
}

/// Build a whole outbound list for `core`
///
/// The list sits under `outbounds` (`proxies` for mihomo). Any node that
/// cannot be built fails the whole document.
pub fn outbounds_document(nodes: &[NodeInfo], core: CoreType, tag_prefix: &str) -> Result<OrderedMap> {
    let outbounds = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| to_outbound_with_tag(node, core, &nth_tag(tag_prefix, i)).map(Value::Map))
        .collect::<Result<Vec<Value>>>()?;

    let key = match core {
        CoreType::Mihomo => "proxies",
        _ => "outbounds",
    };
    let mut document = OrderedMap::new();
    document.set(key, Value::Array(outbounds));
    Ok(document)
}
