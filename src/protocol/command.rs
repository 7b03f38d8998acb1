//! Command catalog organized by service.
//!
//! Each command maps to a fixed `ssap://` resource and an optional payload.
//!
//! # Services
//!
//! | Service | Commands |
//! |---------|----------|
//! | `audio` | Mute, volume, audio status |
//! | `com.webos.applicationManager` | App lists, foreground app |
//! | `system.launcher` | App launch |
//! | `system`, `system.notifications` | Power off, toasts |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Highest volume accepted by `ssap://audio/setVolume`.
pub const MAX_VOLUME: i32 = 100;

// ============================================================================
// Volume
// ============================================================================

/// A volume level known to be in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Volume(u8);

impl Volume {
    /// Silent.
    pub const MIN: Self = Self(0);

    /// Loudest level the TV accepts.
    pub const MAX: Self = Self(MAX_VOLUME as u8);

    /// Validates `level`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `0 <= level <= 100`.
    pub fn new(level: i32) -> Result<Self> {
        if !(0..=MAX_VOLUME).contains(&level) {
            return Err(Error::invalid_argument(format!(
                "volume must be between 0 and {MAX_VOLUME}, got {level}"
            )));
        }
        Ok(Self(level as u8))
    }

    /// Returns the level.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Volume {
    type Error = Error;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Command Wrapper
// ============================================================================

/// All remote commands organized by service.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Audio service commands.
    Audio(AudioCommand),
    /// Application manager and launcher commands.
    Application(ApplicationCommand),
    /// System service commands.
    System(SystemCommand),
}

impl Command {
    /// Returns the target resource.
    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Audio(command) => command.uri(),
            Self::Application(command) => command.uri(),
            Self::System(command) => command.uri(),
        }
    }

    /// Returns the request payload, `None` for argument-less commands.
    #[must_use]
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Audio(command) => command.payload(),
            Self::Application(command) => command.payload(),
            Self::System(command) => command.payload(),
        }
    }
}

impl From<AudioCommand> for Command {
    fn from(command: AudioCommand) -> Self {
        Self::Audio(command)
    }
}

impl From<ApplicationCommand> for Command {
    fn from(command: ApplicationCommand) -> Self {
        Self::Application(command)
    }
}

impl From<SystemCommand> for Command {
    fn from(command: SystemCommand) -> Self {
        Self::System(command)
    }
}

// ============================================================================
// Audio Commands
// ============================================================================

/// Audio service commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCommand {
    /// Read mute state.
    GetMute,
    /// Set mute state.
    SetMute {
        /// `true` to mute.
        mute: bool,
    },
    /// Read volume.
    GetVolume,
    /// Set volume.
    SetVolume {
        /// Target level.
        volume: Volume,
    },
    /// Step volume up.
    VolumeUp,
    /// Step volume down.
    VolumeDown,
    /// Read volume, mute and output status.
    GetStatus,
}

impl AudioCommand {
    /// Creates a set-volume command from a raw level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `0 <= volume <= 100`.
    pub fn set_volume(volume: i32) -> Result<Self> {
        Ok(Self::SetVolume {
            volume: Volume::new(volume)?,
        })
    }

    fn uri(&self) -> &'static str {
        match self {
            Self::GetMute => "ssap://audio/getMute",
            Self::SetMute { .. } => "ssap://audio/setMute",
            Self::GetVolume => "ssap://audio/getVolume",
            Self::SetVolume { .. } => "ssap://audio/setVolume",
            Self::VolumeUp => "ssap://audio/volumeUp",
            Self::VolumeDown => "ssap://audio/volumeDown",
            Self::GetStatus => "ssap://audio/getStatus",
        }
    }

    fn payload(&self) -> Option<Value> {
        match self {
            Self::SetMute { mute } => Some(json!({ "mute": mute })),
            Self::SetVolume { volume } => Some(json!({ "volume": volume.get() })),
            _ => None,
        }
    }
}

// ============================================================================
// Application Commands
// ============================================================================

/// Application manager and launcher commands.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationCommand {
    /// List installed apps.
    ListApps,
    /// List home-screen launch points.
    ListLaunchPoints,
    /// Read the app currently in the foreground.
    GetForegroundAppInfo,
    /// Launch an app.
    Launch {
        /// App id, e.g. `netflix`.
        id: String,
        /// App-specific launch parameters.
        params: Option<Map<String, Value>>,
    },
}

impl ApplicationCommand {
    fn uri(&self) -> &'static str {
        match self {
            Self::ListApps => "ssap://com.webos.applicationManager/listApps",
            Self::ListLaunchPoints => "ssap://com.webos.applicationManager/listLaunchPoints",
            Self::GetForegroundAppInfo => {
                "ssap://com.webos.applicationManager/getForegroundAppInfo"
            }
            Self::Launch { .. } => "ssap://system.launcher/launch",
        }
    }

    fn payload(&self) -> Option<Value> {
        match self {
            Self::Launch { id, params } => {
                let mut payload = Map::new();
                payload.insert("id".into(), Value::String(id.clone()));
                if let Some(params) = params
                    && !params.is_empty()
                {
                    payload.insert("params".into(), Value::Object(params.clone()));
                }
                Some(Value::Object(payload))
            }
            _ => None,
        }
    }
}

// ============================================================================
// System Commands
// ============================================================================

/// System service commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCommand {
    /// Power the TV off.
    TurnOff,
    /// Show a toast notification.
    CreateToast {
        /// Toast text.
        message: String,
    },
}

impl SystemCommand {
    fn uri(&self) -> &'static str {
        match self {
            Self::TurnOff => "ssap://system/turnOff",
            Self::CreateToast { .. } => "ssap://system.notifications/createToast",
        }
    }

    fn payload(&self) -> Option<Value> {
        match self {
            Self::TurnOff => None,
            Self::CreateToast { message } => Some(json!({ "message": message })),
        }
    }
}

// ============================================================================
// StreamingApp
// ============================================================================

/// Streaming apps with a fixed launcher id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamingApp {
    /// Netflix.
    Netflix,
    /// YouTube (leanback client).
    YouTube,
    /// Amazon Prime Video.
    PrimeVideo,
    /// Disney+.
    DisneyPlus,
    /// Hulu.
    Hulu,
}

impl StreamingApp {
    /// Returns the launcher app id.
    #[inline]
    #[must_use]
    pub const fn app_id(&self) -> &'static str {
        match self {
            Self::Netflix => "netflix",
            Self::YouTube => "youtube.leanback.v4",
            Self::PrimeVideo => "amazon",
            Self::DisneyPlus => "disneyplus",
            Self::Hulu => "hulu",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
