use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use api::assets::{AssetClient, AssetConfig};
use api::middleware::JwtVerifier;
use api::routes;
use api::state::AppState;
use common::database::{init_pool, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let jwt = JwtVerifier::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let assets = AssetClient::new(&AssetConfig::from_env());

    let app_state = AppState::new(pool, assets, jwt);

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
