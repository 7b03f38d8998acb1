//! Pairing state machine.
//!
//! ```text
//! Disconnected ──Dial──► Connecting ──Dialed──► AwaitingRegistration ──Registered──► Registered
//!                            │                     │  ▲        │                        │
//!                     TransportFailed       Prompted└──┘  PeerError /                 Close
//!                            ▼                             TransportFailed /            ▼
//!                          Failed ◄───────────────────────  TimedOut                 Closed
//! ```
//!
//! `Close` is accepted from every state and leads to `Closed`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// PairingState
// ============================================================================

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PairingState {
    /// No socket.
    #[default]
    Disconnected,
    /// Socket being opened.
    Connecting,
    /// Register sent, waiting for `registered` or `error`.
    AwaitingRegistration,
    /// Paired; commands may be sent.
    Registered,
    /// Handshake failed. The socket is released by the caller.
    Failed,
    /// Closed by the caller.
    Closed,
}

// ============================================================================
// PairingEvent
// ============================================================================

/// Input to [`PairingState::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairingEvent {
    /// Start opening the socket.
    Dial,
    /// Socket open.
    Dialed,
    /// The TV acknowledged the register request and shows a prompt.
    Prompted,
    /// `registered` received.
    Registered,
    /// `error`, or a `registered` without any usable key, received during
    /// the handshake.
    PeerError,
    /// Socket failed or closed during connect or handshake.
    TransportFailed,
    /// Handshake deadline passed.
    TimedOut,
    /// Caller closed the session.
    Close,
}

// ============================================================================
// Transitions
// ============================================================================

impl PairingState {
    /// Applies an event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for a transition not in the table.
    pub fn on(self, event: PairingEvent) -> Result<Self> {
        use PairingEvent as E;
        use PairingState as S;

        let next = match (self, event) {
            (_, E::Close) => S::Closed,
            (S::Disconnected, E::Dial) => S::Connecting,
            (S::Connecting, E::Dialed) => S::AwaitingRegistration,
            (S::Connecting, E::TransportFailed | E::TimedOut) => S::Failed,
            (S::AwaitingRegistration, E::Prompted) => S::AwaitingRegistration,
            (S::AwaitingRegistration, E::Registered) => S::Registered,
            (
                S::AwaitingRegistration,
                E::PeerError | E::TransportFailed | E::TimedOut,
            ) => S::Failed,
            (state, event) => {
                return Err(Error::protocol(format!(
                    "illegal pairing transition: {event:?} in state {state}"
                )));
            }
        };

        Ok(next)
    }

    /// Returns `true` if commands may be sent.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Registered)
    }

    /// Returns `true` for states no event except `Close` leaves.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingRegistration => "awaiting-registration",
            Self::Registered => "registered",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Tests
// ============================================================================
