//! TV discovery over SSDP.
//!
//! ```text
//! ┌──────────┐  M-SEARCH (UDP multicast)   ┌──────────┐
//! │ Discovery│ ──────────────────────────► │  Devices │
//! │          │ ◄────────────────────────── │          │
//! └────┬─────┘  200 OK + LOCATION          └──────────┘
//!      │
//!      │ GET LOCATION ──► descriptor XML ──► DeviceMatcher
//!      ▼
//!  first match, or None at the deadline
//! ```
//!
//! The whole search is bounded by one absolute deadline; every receive and
//! descriptor fetch is clamped to it.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `ssdp` | M-SEARCH message, `LOCATION` parsing |
//! | `descriptor` | Descriptor XML, device matching |
//! | `fetch` | Descriptor retrieval |
//! | `engine` | Receive loop |

// ============================================================================
// Submodules
// ============================================================================

/// Descriptor XML and device matching.
pub mod descriptor;

/// Receive loop.
pub mod engine;

/// Descriptor retrieval.
pub mod fetch;

/// M-SEARCH message and reply parsing.
pub mod ssdp;

// ============================================================================
// Re-exports
// ============================================================================

pub use descriptor::{DeviceDescriptor, DeviceInfo, DeviceMatcher};
pub use engine::{
    DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_FETCH_TIMEOUT, DEFAULT_MULTICAST_TTL, Discovery,
    DiscoveryOptions, discover,
};
pub use fetch::{DescriptorFetcher, HttpFetcher};
pub use ssdp::SearchRequest;
