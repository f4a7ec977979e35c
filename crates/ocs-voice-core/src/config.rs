use serde::{Deserialize, Deserializer};

use crate::errors::OcsError;
use crate::sdk::GatewayConfiguration;

/// Raw `setOcsConfig` document. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct RawOcsConfig {
    aawg_server: String,
    #[serde(deserialize_with = "port_text")]
    aawg_port: String,
    token: String,
}

/// Hosts send the port either as a decimal string or as a JSON number.
fn port_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match PortValue::deserialize(deserializer)? {
        PortValue::Text(text) => text,
        PortValue::Number(number) => number.to_string(),
    })
}

/// Parsed gateway settings plus the authorization token to use for calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcsConfig {
    pub gateway: GatewayConfiguration,
    pub token: String,
}

impl OcsConfig {
    pub fn from_json(json: &str) -> Result<Self, OcsError> {
        let raw: RawOcsConfig = serde_json::from_str(json)
            .map_err(|e| OcsError::Config(format!("invalid config json: {e}")))?;

        let address = raw.aawg_server.trim();
        if address.is_empty() {
            return Err(OcsError::Config("aawg_server is empty".into()));
        }

        let port: u16 = raw
            .aawg_port
            .trim()
            .parse()
            .map_err(|_| OcsError::Config(format!("invalid aawg_port '{}'", raw.aawg_port)))?;
        if port == 0 {
            return Err(OcsError::Config("aawg_port must be in 1..=65535".into()));
        }

        Ok(Self {
            gateway: GatewayConfiguration {
                address: address.to_string(),
                port,
                secure: true,
            },
            token: raw.token,
        })
    }
}
