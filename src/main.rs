use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seat_reservation::{
    auth,
    config::Config,
    database::Database,
    engine::{RandomFailure, ReservationEngine},
    store::{PgSeatStore, PgUserStore, UserStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seat reservation API");

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.pool_size)
        .await
        .context("failed to connect to database")?;
    info!("Database connected");

    // Run migrations (creates and seeds the seat pool on first start)
    db.run_migrations()
        .await
        .context("failed to run migrations")?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.pool.clone()));
    ensure_admin(&config, users.as_ref()).await?;

    let engine = ReservationEngine::new(
        Arc::new(PgSeatStore::new(db.pool.clone())),
        Arc::new(RandomFailure::new(config.reservation.failure_rate)),
    );

    let state = Arc::new(AppState {
        engine,
        users,
        config: config.clone(),
    });

    let app = seat_reservation::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}

/// Provisions the bootstrap admin account when ADMIN_USERNAME and
/// ADMIN_PASSWORD are configured and no such user exists yet.
async fn ensure_admin(config: &Config, users: &dyn UserStore) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (&config.admin.username, &config.admin.password)
    else {
        return Ok(());
    };

    if users.find_by_username(username).await?.is_none() {
        let hash = auth::hash_password(password)?;
        users.create(username, &hash, true).await?;
        info!(%username, "admin account provisioned");
    }
    Ok(())
}
