#![deny(missing_docs)]
//! A web server for QOTP, provisioning secrets and verifying codes over HTTP.

use clap::Parser;
use local_ip_address::local_ip;
use log::{error, info, warn};
use qotp_core::Settings;
use qotp_web::{AppState, app};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON settings file. Defaults are used when omitted.
    #[arg(long, env = "QOTP_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "QOTP_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Maximum number of provisioning runs executing at once
    #[arg(long, env = "QOTP_KEM_WORKERS", default_value_t = 4)]
    kem_workers: usize,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let settings = Settings::load_or_default(args.config.as_deref()).unwrap_or_else(|e| {
        error!("Failed to load settings: {e}");
        std::process::exit(1);
    });
    info!(
        "Provisioning with {} ({}-byte seeds, {} KEM worker(s))",
        settings.kem, settings.seed_bytes, args.kem_workers
    );
    let state = AppState::new(settings, args.kem_workers).unwrap_or_else(|e| {
        error!("Invalid settings: {e}");
        std::process::exit(1);
    });

    let listener = match tokio::net::TcpListener::bind(args.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {e}", args.bind);
            std::process::exit(1);
        }
    };

    let port = args.bind.port();
    println!("listening on:");
    if args.bind.ip().is_unspecified() {
        match local_ip() {
            Ok(my_local_ip) => println!("  - http://{my_local_ip}:{port}/api/health"),
            Err(e) => warn!("Could not determine the local IP address: {e}"),
        }
        println!("  - http://127.0.0.1:{port}/api/health");
    } else {
        println!("  - http://{}/api/health", args.bind);
    }

    if let Err(e) = axum::serve(listener, app(state)).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
