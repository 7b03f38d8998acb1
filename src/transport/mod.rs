//! WebSocket transport layer.
//!
//! This module handles the encrypted socket between the local end (Rust)
//! and the TV's SSAP endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Session (Rust) │                              │  webOS TV       │
//! │                 │      WebSocket over TLS      │                 │
//! │  dial()         │─────────────────────────────►│  SSAP server    │
//! │  → Connection   │◄────────────────────────────►│  :3001          │
//! │                 │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `dial` - Open `wss://<ip>:3001` without certificate validation
//! 2. Registration handshake on the raw stream (see [`crate::pairing`])
//! 3. `Connection::new` - Spawn the event loop on the registered stream
//! 4. `Connection::request` - One request/answer at a time
//! 5. `Connection::close` - Close the socket and stop the loop
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Event loop and pending-request slot |
//! | `connector` | Endpoint URLs, TLS connector, dialing |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Endpoint construction and dialing.
pub mod connector;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use connector::{Scheme, TvStream, dial, endpoint_url, insecure_tls_connector};
