pub mod error;
pub mod generator;
pub mod models;
pub mod network;
pub mod parser;
pub mod settings;
pub mod utils;

pub use error::{MalformedReason, ShareLinkError};
pub use generator::{outbounds_document, to_outbound_with_tag};
pub use models::{CoreType, NodeInfo, OrderedMap, Scheme, Value};
pub use parser::{detect_scheme, explode, explode_sub};
pub use settings::Settings;
