//! Session application methods.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::protocol::{ApplicationCommand, StreamingApp};

use super::Session;
use super::response::CommandResponse;

// ============================================================================
// Session - Applications
// ============================================================================

impl Session {
    /// Lists installed apps.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn list_apps(&self) -> Result<CommandResponse> {
        self.execute(ApplicationCommand::ListApps).await
    }

    /// Lists home-screen launch points.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn list_launch_points(&self) -> Result<CommandResponse> {
        self.execute(ApplicationCommand::ListLaunchPoints).await
    }

    /// Reads the app in the foreground.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn get_foreground_app(&self) -> Result<CommandResponse> {
        self.execute(ApplicationCommand::GetForegroundAppInfo).await
    }

    /// Launches an app.
    ///
    /// # Arguments
    ///
    /// * `app_id` - App id, e.g. `netflix`
    /// * `params` - App-specific parameters; omitted from the request when
    ///   `None` or empty
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut params = serde_json::Map::new();
    /// params.insert("contentId".into(), "80057281".into());
    /// session.launch_app("netflix", Some(params)).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch_app(
        &self,
        app_id: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<CommandResponse> {
        debug!(app_id = %app_id, "Launching app");
        self.execute(ApplicationCommand::Launch {
            id: app_id.to_string(),
            params,
        })
        .await
    }

    /// Launches one of the well-known streaming apps.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch(&self, app: StreamingApp) -> Result<CommandResponse> {
        self.launch_app(app.app_id(), None).await
    }

    /// Launches Netflix.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch_netflix(&self) -> Result<CommandResponse> {
        self.launch(StreamingApp::Netflix).await
    }

    /// Launches YouTube.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch_youtube(&self) -> Result<CommandResponse> {
        self.launch(StreamingApp::YouTube).await
    }

    /// Launches Prime Video.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch_prime_video(&self) -> Result<CommandResponse> {
        self.launch(StreamingApp::PrimeVideo).await
    }

    /// Launches Disney+.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch_disney_plus(&self) -> Result<CommandResponse> {
        self.launch(StreamingApp::DisneyPlus).await
    }

    /// Launches Hulu.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed.
    pub async fn launch_hulu(&self) -> Result<CommandResponse> {
        self.launch(StreamingApp::Hulu).await
    }
}
