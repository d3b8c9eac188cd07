//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;
use crate::error::{Error, Result};
use crate::tls::auth::{AuthInfo, PROXY_METHOD_LEN};
use crate::tls::fingerprint::Browser;

/// Configuration for a covert transport client.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server's static public key (X25519, base64-encoded in config files).
    #[serde(with = "base64_key")]
    pub server_public_key: [u8; 32],

    /// Client identity registered with the server (hex-encoded).
    #[serde(with = "hex_uid")]
    pub uid: [u8; 16],

    /// Name of the proxied protocol.
    pub proxy_method: String,

    /// Cipher selector for the session layer above the handshake.
    #[serde(default)]
    pub encryption_method: u8,

    /// Hostname to disguise as, or the literal `"random"` to draw a
    /// plausible one per connection.
    pub mock_domain: String,

    /// Browser ClientHello profile to mimic.
    #[serde(default)]
    pub browser: Browser,
}

impl ClientConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.server_public_key == [0u8; 32] {
            return Err(Error::config("server_public_key cannot be all zeros"));
        }
        if self.mock_domain.is_empty() {
            return Err(Error::config("mock_domain cannot be empty"));
        }
        if self.proxy_method.is_empty() {
            return Err(Error::config("proxy_method cannot be empty"));
        }
        if self.proxy_method.len() > PROXY_METHOD_LEN {
            return Err(Error::config(format!(
                "proxy_method exceeds {PROXY_METHOD_LEN} bytes"
            )));
        }
        Ok(())
    }

    /// Assemble the per-attempt identity material for a handshake.
    pub fn auth_info(&self, session_id: u32) -> AuthInfo {
        AuthInfo {
            uid: self.uid,
            session_id,
            proxy_method: self.proxy_method.clone(),
            encryption_method: self.encryption_method,
            server_public_key: PublicKey::from_bytes(self.server_public_key),
            mock_domain: self.mock_domain.clone(),
        }
    }
}

mod base64_key {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 key bytes"))
    }
}

mod hex_uid {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 16], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 16], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 16 uid bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientConfig {
        ClientConfig {
            server_public_key: [1u8; 32],
            uid: [2u8; 16],
            proxy_method: "shadowsocks".to_string(),
            encryption_method: 0,
            mock_domain: "www.example.com".to_string(),
            browser: Browser::Chrome,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let config = sample();
        let json = serde_json::to_string(&config).unwrap();
        let back = ClientConfig::from_json(&json).unwrap();

        assert_eq!(back.server_public_key, config.server_public_key);
        assert_eq!(back.uid, config.uid);
        assert_eq!(back.browser, Browser::Chrome);
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let json = r#"{
            "server_public_key": "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=",
            "uid": "02020202020202020202020202020202",
            "proxy_method": "tcp",
            "mock_domain": "random"
        }"#;
        let config = ClientConfig::from_json(json).unwrap();
        assert_eq!(config.encryption_method, 0);
        assert_eq!(config.browser, Browser::Chrome);
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        let mut config = sample();
        config.server_public_key = [0u8; 32];
        assert!(config.validate().is_err());

        let mut config = sample();
        config.mock_domain.clear();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.proxy_method = "much-too-long-method".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_info_carries_identity() {
        let info = sample().auth_info(9);
        assert_eq!(info.uid, [2u8; 16]);
        assert_eq!(info.session_id, 9);
        assert_eq!(info.mock_domain, "www.example.com");
    }
}
