//! Core data models
//!
//! The parsers produce [`NodeInfo`] values, the generators turn them into
//! [`OrderedMap`] documents for a [`CoreType`].
//!
//! ```rust
//! use shareurl::models::{CoreType, Network, Scheme};
//!
//! let node = shareurl::explode("trojan://secret@example.com:443#Home").unwrap();
//! assert_eq!(node.scheme, Scheme::Trojan);
//! assert_eq!(node.transport, Network::Tcp);
//!
//! let outbound = node.to_outbound_with_tag(CoreType::Xray, "proxy").unwrap();
//! assert_eq!(outbound.keys().last(), Some("tag"));
//! ```

mod core_type;
mod node_info;
mod ordered_map;

pub use core_type::{CoreType, ParseCoreTypeError};
pub use node_info::*;
pub use ordered_map::{OrderedMap, Value};
