use std::sync::Arc;

use ebooks_api::catalog::Catalog;
use ebooks_api::config::{AppState, Config};
use ebooks_api::logger;
use ebooks_api::server::{self, ConnectionCounter, SignalHandler};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let cfg = Config::load_from("config")?;
    logger::init(&cfg)?;

    // The dataset is read once, before any request is accepted
    let catalog = match Catalog::load(&cfg.catalog.data_file) {
        Ok(catalog) => catalog,
        Err(e) => {
            logger::log_error(&format!("Failed to load catalog: {e}"));
            return Err(e.into());
        }
    };
    logger::log_dataset_loaded(&cfg, &catalog);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, catalog))
}

async fn async_main(cfg: Config, catalog: Catalog) -> Result<(), BoxError> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg, catalog));
    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::start_server_loop(listener, state, Arc::new(ConnectionCounter::new()), signals).await
}
