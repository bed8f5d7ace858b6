use serde::{Deserialize, Serialize};

fn default_device_name() -> String {
    "Trezor".to_string()
}

fn default_coin_name() -> String {
    "Bitcoin".to_string()
}

/// Per-session settings supplied by the wallet when a device is opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Name substituted into every prompt, e.g. "Confirm address on Trezor
    /// device to continue".
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Coin used by `first_address` / `address_from_derivation`.
    #[serde(default = "default_coin_name")]
    pub coin_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            coin_name: default_coin_name(),
        }
    }
}

impl SessionConfig {
    pub fn with_device_name(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Self::default()
        }
    }
}
