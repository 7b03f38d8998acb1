//! Signed application manifest and register payload.
//!
//! The manifest declares the permissions the remote asks for. Its signature
//! covers the `signed` block, so the default value must not be edited.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identifiers::ClientKey;

// ============================================================================
// Constants
// ============================================================================

/// Permissions inside the signed block.
const SIGNED_PERMISSIONS: &[&str] = &[
    "TEST_SECURE",
    "CONTROL_INPUT_TEXT",
    "CONTROL_MOUSE_AND_KEYBOARD",
    "READ_INSTALLED_APPS",
    "READ_LGE_SDX",
    "READ_NOTIFICATIONS",
    "SEARCH",
    "WRITE_SETTINGS",
    "WRITE_NOTIFICATION_ALERT",
    "CONTROL_POWER",
    "READ_CURRENT_CHANNEL",
    "READ_RUNNING_APPS",
    "READ_UPDATE_INFO",
    "UPDATE_FROM_REMOTE_APP",
    "READ_LGE_TV_INPUT_EVENTS",
    "READ_TV_CURRENT_TIME",
    "CONTROL_AUDIO",
];

/// Permissions requested outside the signed block.
const PERMISSIONS: &[&str] = &[
    "LAUNCH",
    "LAUNCH_WEBAPP",
    "APP_TO_APP",
    "CLOSE",
    "TEST_OPEN",
    "TEST_PROTECTED",
    "CONTROL_AUDIO",
    "CONTROL_DISPLAY",
    "CONTROL_INPUT_JOYSTICK",
    "CONTROL_INPUT_MEDIA_RECORDING",
    "CONTROL_INPUT_MEDIA_PLAYBACK",
    "CONTROL_INPUT_TV",
    "CONTROL_POWER",
    "READ_APP_STATUS",
    "READ_CURRENT_CHANNEL",
    "READ_INPUT_DEVICE_LIST",
    "READ_NETWORK_STATE",
    "READ_RUNNING_APPS",
    "READ_TV_CHANNEL_LIST",
    "WRITE_NOTIFICATION_TOAST",
    "READ_POWER_STATE",
    "READ_COUNTRY_INFO",
];

const SIGNATURE: &str = "eyJhbGdvcml0aG0iOiJSU0EtU0hBMjU2Iiwia2V5SWQiOiJ0ZXN0LXNpZ25pbmctY2VydCIsInNpZ25hdHVyZVZlcnNpb24iOjF9.hrVRgjCwXVvE2OOSpDZ58hR+59aFNwYDyjQgKk3auukd7pcegmE2CzPCa0bJ0ZsRAcKkCTJrWo5iDzNhMBWRyaMOv5zWSrthlf7G128qvIlpMT0YNY+n/FaOHE73uLrS/g7swl3/qH/BGFG2Hu4RlL48eb3lLKqTt2xKHdCs6Cd4RMfJPYnzgvI4BNrFUKsjkcu+WD4OO2A27Pq1n50cMchmcaXadJhGrOqH5YmHdOCj5NSHzJYrsW0HPlpuAx/ECMeIZYDh6RMqaFM2DXzdKX9NmmyqzJ3o/0lkk/N97gfVRLW5hA29yeAwaCViZNCP8iC9aO0q9fQojoa7NQnAtw==";

// ============================================================================
// Manifest
// ============================================================================

/// Capability declaration sent with the register request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest format version.
    pub manifest_version: u32,
    /// Application version string.
    pub app_version: String,
    /// Signed identity and permissions.
    pub signed: SignedManifest,
    /// Requested permissions.
    pub permissions: Vec<String>,
    /// Signatures over the `signed` block.
    pub signatures: Vec<Signature>,
}

/// The signed part of a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedManifest {
    /// Creation date as `YYYYMMDD`.
    pub created: String,
    /// Application id.
    pub app_id: String,
    /// Vendor id.
    pub vendor_id: String,
    /// Application names keyed by locale (`""` is the default).
    pub localized_app_names: BTreeMap<String, String>,
    /// Vendor names keyed by locale.
    pub localized_vendor_names: BTreeMap<String, String>,
    /// Signed permissions.
    pub permissions: Vec<String>,
    /// Serial number.
    pub serial: String,
}

/// One manifest signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    /// Signature format version.
    pub signature_version: u32,
    /// Signature value.
    pub signature: String,
}

impl Default for Manifest {
    fn default() -> Self {
        let to_strings = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();

        Self {
            manifest_version: 1,
            app_version: "1.1".to_string(),
            signed: SignedManifest {
                created: "20140509".to_string(),
                app_id: "com.lge.test".to_string(),
                vendor_id: "com.lge".to_string(),
                localized_app_names: BTreeMap::from([
                    (String::new(), "LG Remote App".to_string()),
                    ("ko-KR".to_string(), "LG 리모컨 앱".to_string()),
                    ("zxx-XX".to_string(), "LG Rэмотэ Aпп".to_string()),
                ]),
                localized_vendor_names: BTreeMap::from([(
                    String::new(),
                    "LG Electronics".to_string(),
                )]),
                permissions: to_strings(SIGNED_PERMISSIONS),
                serial: "2f930e2d2cfe083771f68e4fe7bb07".to_string(),
            },
            permissions: to_strings(PERMISSIONS),
            signatures: vec![Signature {
                signature_version: 1,
                signature: SIGNATURE.to_string(),
            }],
        }
    }
}

// ============================================================================
// PairingType
// ============================================================================

/// How the TV asks the user to confirm pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairingType {
    /// On-screen accept/deny prompt.
    #[default]
    Prompt,
    /// PIN shown on screen.
    Pin,
    /// Prompt or PIN, chosen by the TV.
    Combined,
}

// ============================================================================
// RegisterPayload
// ============================================================================

/// Payload of the register message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterPayload {
    /// Ask the TV to prompt even when a key is known.
    #[serde(rename = "forcePairing")]
    pub force_pairing: bool,

    /// Prompt style.
    #[serde(rename = "pairingType")]
    pub pairing_type: PairingType,

    /// Capability declaration.
    pub manifest: Manifest,

    /// Previously issued key; lets the TV skip the prompt.
    #[serde(rename = "client-key", skip_serializing_if = "Option::is_none")]
    pub client_key: Option<ClientKey>,
}

impl RegisterPayload {
    /// Creates a prompt-style payload with the default manifest.
    #[must_use]
    pub fn new(client_key: Option<ClientKey>) -> Self {
        Self {
            force_pairing: false,
            pairing_type: PairingType::Prompt,
            manifest: Manifest::default(),
            client_key,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
