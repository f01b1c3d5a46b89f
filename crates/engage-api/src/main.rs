use engage_api::{routes, server, state, telemetry};
use engage_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    config.validate()?;

    telemetry::init_tracing();

    let app_state = state::AppState::initialize(config.clone()).await?;
    let router = routes::build_router(app_state);

    server::start_server(&config, router).await?;

    Ok(())
}
