//! Session system methods.

use tracing::{debug, info};

use crate::error::Result;
use crate::protocol::SystemCommand;

use super::Session;
use super::response::CommandResponse;

// ============================================================================
// Session - System
// ============================================================================

impl Session {
    /// Turns the TV off.
    ///
    /// The TV usually drops the socket shortly after answering.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn turn_off(&self) -> Result<CommandResponse> {
        info!(endpoint = %self.endpoint(), "Turning TV off");
        self.execute(SystemCommand::TurnOff).await
    }

    /// Shows a toast notification on screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn show_toast(&self, message: &str) -> Result<CommandResponse> {
        debug!(len = message.len(), "Showing toast");
        self.execute(SystemCommand::CreateToast {
            message: message.to_string(),
        })
        .await
    }
}
