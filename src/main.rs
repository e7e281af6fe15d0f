use clap::Parser;
use tracing_subscriber::EnvFilter;
use vinebot_zenoh_runtime::runtime::{self, RuntimeOptions};

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let options = RuntimeOptions::parse();

    if let Err(e) = runtime::run(options).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
