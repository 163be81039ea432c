use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use mediacrawler::config::state::AppState;
use mediacrawler::core::{logging, server};
use mediacrawler::crawler::sync::spawn_crawl_scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // set up logging
    logging::init_tracing();

    // connect to Postgres + Redis and run the schema migration
    AppState::init_services().await?;

    let app: Router = server::create_app();
    let listener: TcpListener = server::setup_listener().await?;

    tracing::info!("Server listening on: {}", listener.local_addr()?);

    // background Bilibili sweep
    let crawler: JoinHandle<()> = spawn_crawl_scheduler(AppState::instance());

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    crawler.abort();

    Ok(())
}
