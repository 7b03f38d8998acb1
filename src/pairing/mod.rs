//! Registration (pairing) with the TV.
//!
//! The first connection makes the TV show an accept/deny prompt; once the
//! user accepts, the TV issues a client key. Later connections send that key
//! with the register request and are accepted silently.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `state` | Pairing state machine |
//! | `handshake` | Register/registered exchange |
//! | `store` | Credential persistence boundary |

// ============================================================================
// Submodules
// ============================================================================

/// Register/registered exchange.
pub mod handshake;

/// Pairing state machine.
pub mod state;

/// Credential persistence.
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use handshake::{Handshake, Registration};
pub use state::{PairingEvent, PairingState};
pub use store::{CredentialStore, DEFAULT_ENV_VAR, EnvFileCredentialStore, MemoryCredentialStore};
