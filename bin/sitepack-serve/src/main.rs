//! Sitepack Server
//!
//! Serves the asset registry compiled into this binary. Point
//! `SITEPACK_REGISTRY` at the output of `sitepack build` when building.

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::SystemTime};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use sitepack_server::{Registry, TlsFiles};

mod embedded {
    include!(concat!(env!("OUT_DIR"), "/registry.rs"));
}

/// Command-line interface for the sitepack server.
#[derive(Parser)]
#[command(
    name = "sitepack-serve",
    version,
    about = "Serve an embedded sitepack registry over HTTP"
)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "SITEPACK_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// PEM certificate chain; enables TLS together with --tls-key
    #[arg(long, env = "SITEPACK_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key; enables TLS together with --tls-cert
    #[arg(long, env = "SITEPACK_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn tls(&self) -> Result<Option<TlsFiles>> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Ok(Some(TlsFiles {
                cert: cert.clone(),
                key: key.clone(),
            })),
            (None, None) => Ok(None),
            _ => bail!("--tls-cert and --tls-key must be given together"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    sitepack_server::init_tracing(cli.verbose);

    let started = SystemTime::now();
    let registry = Registry::load(embedded::ASSETS).wrap_err("Embedded registry is corrupt")?;
    if registry.is_empty() {
        tracing::warn!("embedded registry is empty, every request will get 404");
    }

    let app = sitepack_server::create_router(Arc::new(registry), started);
    sitepack_server::serve(app, cli.addr, cli.tls()?)
        .await
        .wrap_err("Server error")?;

    Ok(())
}
