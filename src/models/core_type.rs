use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Proxy-core engines an outbound can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum CoreType {
    Xray,
    V2ray,
    SingBox,
    Mihomo,
}

impl CoreType {
    pub const ALL: [CoreType; 4] = [
        CoreType::Xray,
        CoreType::V2ray,
        CoreType::SingBox,
        CoreType::Mihomo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CoreType::Xray => "xray",
            CoreType::V2ray => "v2ray",
            CoreType::SingBox => "sing-box",
            CoreType::Mihomo => "mihomo",
        }
    }
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown core type: {0}")]
pub struct ParseCoreTypeError(pub String);

impl FromStr for CoreType {
    type Err = ParseCoreTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xray" => Ok(CoreType::Xray),
            "v2ray" | "v2fly" => Ok(CoreType::V2ray),
            "sing-box" | "singbox" => Ok(CoreType::SingBox),
            "mihomo" | "clash.meta" | "clash-meta" => Ok(CoreType::Mihomo),
            _ => Err(ParseCoreTypeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for CoreType {
    type Error = ParseCoreTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_type_names_round_trip() {
        for core in CoreType::ALL {
            assert_eq!(core.as_str().parse::<CoreType>(), Ok(core));
        }
        assert_eq!("SingBox".parse::<CoreType>(), Ok(CoreType::SingBox));
        assert_eq!("clash.meta".parse::<CoreType>(), Ok(CoreType::Mihomo));
        assert!("clash-premium".parse::<CoreType>().is_err());
    }
}
