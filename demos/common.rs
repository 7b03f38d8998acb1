//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::net::IpAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

/// Discovery window when no `--timeout` is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    /// Skip discovery and connect here.
    pub ip: Option<IpAddr>,
    /// Discovery window.
    pub timeout: Duration,
    /// Volume to set after reading it.
    pub volume: Option<i32>,
    /// Use plain `ws://` on port 3000.
    pub plain: bool,
    /// Match vendor and platform ignoring case.
    pub ignore_case: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            ip: value("--ip").and_then(|v| v.parse().ok()),
            timeout: Duration::from_secs(
                value("--timeout")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            volume: value("--volume").and_then(|v| v.parse().ok()),
            plain: args.iter().any(|a| a == "--ws"),
            ignore_case: args.iter().any(|a| a == "--ignore-case"),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins over `--debug` when set.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "webos_remote=debug"
        } else {
            "webos_remote=info"
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
