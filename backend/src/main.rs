//! Server entry-point: loads settings, selects the resident store and serves
//! the REST API with OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use resident_directory::inbound::http::health::HealthState;
use server::{ServerSettings, build_http_state, connect_store, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let bind_addr = settings.bind_addr();

    let store = connect_store(&settings).await?;
    let http_state = build_http_state(store);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, bind_addr)?;
    info!(%bind_addr, "resident directory listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
