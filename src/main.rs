//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use atlastech_backend::{
    app::build_router,
    config::{AppState, Config},
    db::{ServicePackRepository, UserRepository},
    seed,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let seed_on_startup = config.seed_on_startup;
    let admin_seed_password = config.admin_seed_password.clone();

    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("Database migrations applied");

    if seed_on_startup {
        seed::run(
            &UserRepository::new(app_state.db_pool.clone()),
            &ServicePackRepository::new(app_state.db_pool.clone()),
            admin_seed_password.as_deref(),
        )
        .await?;
        tracing::info!("Seed data applied");
    }

    let app = build_router(app_state)?;

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
