#![cfg(not(tarpaulin_include))]

use paged_loader::app;
use paged_loader::config::ServerConfig;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Everything after the program name is a flag
    let config = ServerConfig::from_args(env::args().skip(1))?;

    log::info!(
        "Starting list server with {} articles, {} per page",
        config.catalogue_size,
        config.default_page_size
    );
    app::run(config).await
}
