use std::sync::Arc;

mod api;
mod config;
mod logger;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Worker thread count follows `server.workers`, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_debug(&format!("Using {workers} worker threads"));
    } else {
        logger::log_debug("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let trivia = store::TriviaStore::open(&cfg.store)?;
    let question_count = trivia.question_count().await;
    let category_count = trivia.categories().await.len();

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.server.backlog)?;

    logger::log_server_start(
        &addr,
        &cfg,
        trivia.data_file(),
        question_count,
        category_count,
    );

    let state = Arc::new(config::AppState::new(cfg, trivia));
    server::start_signal_handler(Arc::clone(&state.shutdown))?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state)).await;

    Ok(())
}
