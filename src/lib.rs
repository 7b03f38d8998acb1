//! webOS Remote - discovery, pairing and remote control for LG webOS TVs.
//!
//! This library finds a TV on the local network, pairs with it over its
//! SSAP WebSocket endpoint and sends remote-control commands.
//!
//! # Architecture
//!
//! The library follows the order a caller uses it in:
//!
//! - **Discovery**: SSDP `M-SEARCH`, descriptor fetch, vendor/platform match
//! - **Pairing**: `register` handshake; the TV prompts once and issues a
//!   client key that later connections reuse
//! - **Session**: one request at a time over the registered socket
//!
//! Key design principles:
//!
//! - Each [`Session`] owns one WebSocket connection and its event loop
//! - Credentials cross a [`CredentialStore`] boundary; nothing is global
//! - TV-side command failures are data ([`CommandResponse`]), not errors
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use webos_remote::{EnvFileCredentialStore, Session, discover};
//!
//! #[tokio::main]
//! async fn main() -> webos_remote::Result<()> {
//!     let Some(tv) = discover(Duration::from_secs(10)).await? else {
//!         return Ok(());
//!     };
//!
//!     // Reuses CLIENT_KEY from .env; stores the new key after first pairing
//!     let store = EnvFileCredentialStore::discover()?;
//!     let session = Session::builder()
//!         .credential_store(Arc::new(store))
//!         .connect(tv.ip)
//!         .await?;
//!
//!     let volume = session.get_volume().await?;
//!     println!("volume: {:?}", volume.payload());
//!     session.set_volume(15).await?;
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`discovery`] | SSDP search and descriptor matching |
//! | [`pairing`] | Registration state machine and credential stores |
//! | [`session`] | [`Session`], its builder and command methods |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Request ids and client keys |
//! | [`protocol`] | SSAP message types |
//! | [`transport`] | WebSocket connection and event loop |

// ============================================================================
// Modules
// ============================================================================

/// SSDP discovery.
///
/// Use [`discover()`] for the common case or [`Discovery`] for full control.
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Registration handshake and credential persistence.
pub mod pairing;

/// SSAP protocol message types.
pub mod protocol;

/// Registered session and command methods.
///
/// Use [`Session::builder()`] to open a session.
pub mod session;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Discovery types
pub use discovery::{
    DescriptorFetcher, DeviceDescriptor, DeviceMatcher, Discovery, DiscoveryOptions, HttpFetcher,
    discover,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ClientKey, RequestId};

// Pairing types
pub use pairing::{
    CredentialStore, EnvFileCredentialStore, MemoryCredentialStore, PairingState, Registration,
};

// Protocol types
pub use protocol::{
    ApplicationCommand, AudioCommand, Command, Manifest, PairingType, StreamingApp, SystemCommand,
    Volume,
};

// Session types
pub use session::{CommandResponse, Session, SessionBuilder, SessionOptions};

// Transport types
pub use transport::Scheme;
