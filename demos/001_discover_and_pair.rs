//! Discover a TV, pair with it and adjust the volume.
//!
//! Demonstrates:
//! - SSDP discovery (skipped with `--ip`)
//! - Pairing with the `.env` credential store
//! - Reading and setting the volume
//!
//! The first run makes the TV show a pairing prompt; accept it with the
//! remote. The issued key is written to `CLIENT_KEY` in `.env` and later
//! runs connect without a prompt.
//!
//! Usage:
//!   cargo run --example 001_discover_and_pair
//!   cargo run --example 001_discover_and_pair -- --ip 192.168.1.50 --volume 12
//!   cargo run --example 001_discover_and_pair -- --timeout 5 --ignore-case
//!   cargo run --example 001_discover_and_pair -- --ws --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::net::IpAddr;
use std::sync::Arc;

use common::Args;
use webos_remote::{
    DeviceMatcher, Discovery, DiscoveryOptions, EnvFileCredentialStore, Result, Scheme, Session,
    SessionOptions,
};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 001: Discover and Pair ===\n");

    // ========================================================================
    // Discover
    // ========================================================================

    let Some(ip) = locate(&args).await? else {
        println!("    ✗ No LG webOS TV found");
        return Ok(());
    };

    // ========================================================================
    // Connect
    // ========================================================================

    let store = EnvFileCredentialStore::discover()?;
    println!("[2] Connecting to {ip}...");
    println!("    Credentials: {}", store.path().display());

    let options = if args.plain {
        SessionOptions::new().with_scheme(Scheme::Ws)
    } else {
        SessionOptions::new()
    };

    let session = Session::builder()
        .credential_store(Arc::new(store))
        .options(options)
        .connect(ip)
        .await?;

    if session.registration().is_new() {
        println!("    ✓ Paired, new key saved");
    } else {
        println!("    ✓ Connected with stored key");
    }
    println!("    Endpoint: {}\n", session.endpoint());

    // ========================================================================
    // Volume
    // ========================================================================

    println!("[3] Reading volume...");
    let status = session.get_volume().await?;
    match status.payload() {
        Some(payload) => println!("    ✓ {payload}\n"),
        None => println!("    ✗ {status:?}\n"),
    }

    if let Some(volume) = args.volume {
        println!("[4] Setting volume to {volume}...");
        let response = session.set_volume(volume).await?;
        if response.is_ok() {
            println!("    ✓ Volume set\n");
        } else {
            println!("    ✗ {response:?}\n");
        }
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    println!("[Cleanup] Closing session...");
    session.close().await;
    println!("          ✓ Done");

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

async fn locate(args: &Args) -> Result<Option<IpAddr>> {
    if let Some(ip) = args.ip {
        println!("[1] Using {ip}\n");
        return Ok(Some(ip));
    }

    println!("[1] Searching for {}s...", args.timeout.as_secs());

    let matcher = DeviceMatcher::default().with_case_sensitive(!args.ignore_case);
    let options = DiscoveryOptions::new()
        .with_timeout(args.timeout)
        .with_matcher(matcher);

    let device = Discovery::new(options)?.discover().await?;
    if let Some(device) = &device {
        println!("    ✓ Found {device}");
        println!("    Descriptor: {}\n", device.location);
    }

    Ok(device.map(|device| device.ip))
}
