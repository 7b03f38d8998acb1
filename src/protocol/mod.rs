//! WebSocket protocol message types.
//!
//! This module defines the JSON frames exchanged with the TV's SSAP
//! (Simple Service Access Protocol) endpoint.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `register` | Local → TV | Pairing request |
//! | `registered` | TV → Local | Pairing accepted |
//! | `request` | Local → TV | Command request |
//! | `response` | TV → Local | Command response |
//! | `error` | TV → Local | Pairing or command failure |
//!
//! # Resource Naming
//!
//! Commands address `ssap://service/method` resources:
//!
//! - `ssap://audio/setVolume`
//! - `ssap://system.launcher/launch`
//! - `ssap://com.webos.applicationManager/listApps`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command catalog by service |
//! | `manifest` | Signed manifest and register payload |
//! | `message` | Outgoing/incoming envelopes |

// ============================================================================
// Submodules
// ============================================================================

/// Command catalog organized by service.
pub mod command;

/// Signed manifest and register payload.
pub mod manifest;

/// Outgoing and incoming message envelopes.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    ApplicationCommand, AudioCommand, Command, MAX_VOLUME, StreamingApp, SystemCommand, Volume,
};
pub use manifest::{Manifest, PairingType, RegisterPayload, Signature, SignedManifest};
pub use message::{IncomingMessage, Inbound, OutgoingMessage};
