use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

use static_server::cli::Cli;
use static_server::config::{AppState, Config};
use static_server::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config, &cli.overrides())?;
    logger::init(&cfg.logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    // Build the runtime by hand so `performance.workers` can size it
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.performance.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, cli.open))
}

async fn async_main(cfg: Config, open: bool) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let url = cfg.public_url();

    logger::log_server_start(&listener.local_addr()?, &cfg);
    let state = Arc::new(AppState::new(cfg)?);

    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;

    if open {
        tokio::spawn(async move { server::browser::open_browser(&url).await });
    }

    server::run(listener, state, shutdown).await;
    Ok(())
}
