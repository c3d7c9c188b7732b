//! Sitepack Server Library
//!
//! Runtime half of sitepack: loads the embedded asset registry once at
//! startup and answers HTTP requests for exactly the registered paths.
//!
//! # Modules
//!
//! - [`registry`] - Decoded, immutable asset registry
//! - [`content_type`] - Extension lookup and content sniffing
//! - [`range`] - Single byte-range resolution
//! - [`server`] - Router, conditional requests and listeners

pub mod content_type;
pub mod range;
pub mod registry;
pub mod server;

pub use registry::{Asset, Registry, RegistryError};
pub use server::{ServerState, TlsFiles, create_router, serve};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
