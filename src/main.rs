//! Startup Directory — Binary Entrypoint
//! Boots the Axum HTTP server: loads config, ingests the CSV sources once, and
//! serves the listing/query API.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    startup_directory::init_tracing();

    let router = startup_directory::app().await?;
    Ok(router.into())
}
