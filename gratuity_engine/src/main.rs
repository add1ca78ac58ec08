//! Entry point for the Gratuity Engine binary.
//!
//! Running this binary starts an HTTP server exposing the calculation
//! API.  The bind address, upload limit and log level are read from
//! `GRATUITY_*` environment variables (or a `.env` file); see
//! [`gratuity_engine::config::AppConfig`].

use gratuity_engine::config::AppConfig;
use gratuity_engine::{api, telemetry};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error running server: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    api::serve(&config.server).await
}
