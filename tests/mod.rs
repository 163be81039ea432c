//! tests/mod.rs
//! A shared test helper to spawn the mediacrawler app on an ephemeral port.

use axum::error_handling::HandleErrorLayer;
use mediacrawler::config::{state::AppState, environment::EnvironmentVariables};
use mediacrawler::api::auth::{auth_routes, logout_route};
use mediacrawler::api::follow::follow_routes;
use mediacrawler::api::health::health_routes;
use mediacrawler::api::influencers::influencer_routes;
use mediacrawler::api::middleware::session_middleware;
use mediacrawler::utils::{
    error_handler::handle_global_error,
    response_handler::response_wrapper,
};

use std::time::Duration;
use tokio::net::TcpListener as TokioTcpListener;
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use axum::{Router, extract::DefaultBodyLimit, middleware::{from_fn, from_fn_with_state}};
use axum::serve;

/// Spawns the app on a random unused port and returns its base URL.
/// Postgres and Redis connect lazily, so routes that never reach them
/// (auth gating, validation, global errors) work without live services.
pub fn spawn_app() -> String {
    // * Grab environment variables and state from the singletons.
    let env: &EnvironmentVariables = EnvironmentVariables::instance();
    let state: AppState = AppState::instance().clone();

    // * Build the application using the same layers as main().
    let protected: Router<AppState> = Router::new()
        .merge(influencer_routes())
        .merge(follow_routes())
        .merge(logout_route())
        .layer(from_fn_with_state(state.clone(), session_middleware));

    let app: Router = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(response_wrapper))                // unify JSON output
                .layer(HandleErrorLayer::new(handle_global_error)) // map layer errors to HTTP codes
                .layer(TimeoutLayer::new(Duration::from_secs(env.default_timeout_seconds)))
                .layer(DefaultBodyLimit::max(env.max_request_body_size))
        )
        .with_state(state);

    // * Bind an ephemeral port using std::net::TcpListener.
    let std_listener: std::net::TcpListener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    std_listener.set_nonblocking(true).unwrap();

    // * Convert std::net::TcpListener to tokio::net::TcpListener.
    let tokio_listener: TokioTcpListener = TokioTcpListener::from_std(std_listener)
        .expect("Failed to convert to tokio listener");

    let addr: std::net::SocketAddr = tokio_listener.local_addr().unwrap();

    // * Spawn the server in a background task.
    tokio::spawn(async move {
        serve(tokio_listener, app)
            .await
            .expect("Server failed");
    });

    // * Return the base URL, e.g. "http://127.0.0.1:12345".
    format!("http://{}", addr)
}
