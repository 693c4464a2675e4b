use std::process;

use cocktail_api::{
    config::{init_logging, Config},
    routes::routes,
    state::State,
};

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {e}");
        process::exit(1);
    });
    let port = config.port;

    let state = State::new(config).await.unwrap_or_else(|e| {
        log::error!("Startup failed: {e}");
        process::exit(1);
    });

    log::info!("Server is running on port {port}");
    warp::serve(routes(state)).run(([0, 0, 0, 0], port)).await;
}
