//! Registered session with a TV.
//!
//! A [`Session`] is opened through [`Session::builder()`]: dial, register,
//! then send commands one at a time.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Session struct, `send_command`, `close` |
//! | `builder` | Configuration and `connect` |
//! | `options` | Timeouts, scheme, port |
//! | `response` | Command outcome |
//! | `audio` | Volume and mute |
//! | `apps` | App listing and launching |
//! | `system` | Power and notifications |
//!
//! # Example
//!
//! ```ignore
//! let session = Session::builder().connect(ip).await?;
//!
//! let volume = session.get_volume().await?;
//! session.set_volume(15).await?;
//! session.launch_netflix().await?;
//!
//! session.close().await;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod apps;
mod audio;
mod builder;
mod core;
mod options;
mod response;
mod system;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Session;
pub use builder::SessionBuilder;
pub use options::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PING_INTERVAL, DEFAULT_REGISTRATION_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT, SessionOptions,
};
pub use response::CommandResponse;
