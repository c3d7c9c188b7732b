//! Sitepack Core Library
//!
//! Configuration, error handling and the registry wire codec shared by the
//! offline compiler and the runtime asset server.

pub mod codec;
pub mod config;
pub mod error;

pub use codec::{CodecError, DecodedPayload};
pub use config::Config;
pub use error::{CoreError, Result};
