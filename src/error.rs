use std::fmt;

use thiserror::Error;

use crate::models::{CoreType, Scheme};

/// Why a link was rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Base64 payload or embedded JSON could not be decoded.
    Decode,
    /// Host or port is missing, empty or out of range.
    Address,
    /// A vless link asked for an encryption other than `none`.
    Encryption,
    /// A query parameter carries a value the parser cannot use.
    Parameter(&'static str),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::Decode => f.write_str("decode"),
            MalformedReason::Address => f.write_str("address"),
            MalformedReason::Encryption => f.write_str("encryption"),
            MalformedReason::Parameter(key) => write!(f, "parameter {}", key),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareLinkError {
    #[error("unsupported share link scheme: {prefix}")]
    UnsupportedScheme { prefix: String },

    #[error("malformed {scheme} link: {reason}")]
    MalformedLink {
        scheme: Scheme,
        reason: MalformedReason,
    },

    #[error("{scheme} link is missing mandatory field `{field}`")]
    MissingField { scheme: Scheme, field: &'static str },

    #[error("core {core} cannot represent {scheme} outbounds")]
    UnsupportedCore { core: CoreType, scheme: Scheme },
}

impl ShareLinkError {
    pub(crate) fn malformed(scheme: Scheme, reason: MalformedReason) -> Self {
        ShareLinkError::MalformedLink { scheme, reason }
    }

    pub(crate) fn missing(scheme: Scheme, field: &'static str) -> Self {
        ShareLinkError::MissingField { scheme, field }
    }
}

pub type Result<T, E = ShareLinkError> = std::result::Result<T, E>;
