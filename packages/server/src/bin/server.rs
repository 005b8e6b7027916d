//! Teslo realtime server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=changeme cargo run --bin teslo-server
//! cargo run --bin teslo-server -- --host 0.0.0.0 --port 3000 --jwt-secret changeme
//! ```

use std::sync::Arc;

use clap::Parser;
use teslo_server::{
    infrastructure::{
        broadcast::ChannelBroadcastBus, registry::InMemoryConnectionRegistry,
        verifier::JwtIdentityVerifier,
    },
    ui::Server,
    usecase::Gateway,
};
use teslo_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "teslo-server")]
#[command(about = "Realtime presence and chat server for Teslo Shop", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Secret used to verify HS256 access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Required `iss` claim, if any
    #[arg(long, env = "JWT_ISSUER")]
    jwt_issuer: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Wire dependencies in order:
    // 1. IdentityVerifier
    // 2. ConnectionRegistry
    // 3. BroadcastBus
    // 4. Gateway
    // 5. Server
    let verifier = Arc::new(JwtIdentityVerifier::new(
        args.jwt_secret.as_bytes(),
        args.jwt_issuer.as_deref(),
    ));
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let bus = Arc::new(ChannelBroadcastBus::new());
    let gateway = Arc::new(Gateway::new(
        verifier,
        registry,
        bus,
        Arc::new(SystemClock),
    ));

    let server = Server::new(gateway);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
