//! Session audio methods.

use tracing::debug;

use crate::error::Result;
use crate::protocol::AudioCommand;

use super::Session;
use super::response::CommandResponse;

// ============================================================================
// Session - Audio
// ============================================================================

impl Session {
    /// Reads the mute state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn get_mute(&self) -> Result<CommandResponse> {
        self.execute(AudioCommand::GetMute).await
    }

    /// Mutes or unmutes.
    ///
    /// # Arguments
    ///
    /// * `mute` - `true` to mute
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn set_mute(&self, mute: bool) -> Result<CommandResponse> {
        debug!(mute, "Setting mute");
        self.execute(AudioCommand::SetMute { mute }).await
    }

    /// Reads the volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn get_volume(&self) -> Result<CommandResponse> {
        self.execute(AudioCommand::GetVolume).await
    }

    /// Sets the volume.
    ///
    /// The range is checked before anything is sent.
    ///
    /// # Arguments
    ///
    /// * `volume` - Level in `0..=100`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `volume` is out of range
    /// - Any [`send_command`](Self::send_command) error
    pub async fn set_volume(&self, volume: i32) -> Result<CommandResponse> {
        let command = AudioCommand::set_volume(volume)?;
        debug!(volume, "Setting volume");
        self.execute(command).await
    }

    /// Steps the volume up.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn volume_up(&self) -> Result<CommandResponse> {
        self.execute(AudioCommand::VolumeUp).await
    }

    /// Steps the volume down.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn volume_down(&self) -> Result<CommandResponse> {
        self.execute(AudioCommand::VolumeDown).await
    }

    /// Reads volume, mute and output status in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn get_audio_status(&self) -> Result<CommandResponse> {
        self.execute(AudioCommand::GetStatus).await
    }
}
