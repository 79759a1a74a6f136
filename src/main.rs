use price_tracker::{ Config, Result };
use axum::{ Router, routing::{ get, post } };
use migration::{ Migrator, MigratorTrait };
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "price_tracker=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| price_tracker::AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting price-tracker (check interval {}s, item delay {}s)",
        config.check_interval_secs,
        config.item_delay_secs
    );

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(price_tracker::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    Migrator::up(&db, None).await.map_err(price_tracker::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // Initialize capabilities
    let fetcher = Arc::new(
        price_tracker::fetcher::AmazonFetcher::new(config.fetch_timeout(), &config.user_agent)
    );
    let notifier = Arc::new(
        price_tracker::notifier::EmailNotifier::new(
            config.resend_api_key.clone(),
            config.alert_from_email.clone()
        )
    );
    let store = Arc::new(price_tracker::db::SqlDatastore::new(db.clone()));

    // Initialize services
    let engine = Arc::new(
        price_tracker::services::PriceCheckEngine::new(
            store,
            fetcher.clone(),
            notifier,
            config.item_delay()
        )
    );

    let product_service = Arc::new(
        price_tracker::services::ProductService::new(db, fetcher)
    );

    // Background check cycles
    let scheduler = price_tracker::scheduler::Scheduler::new(
        engine.clone(),
        config.check_interval()
    );
    tokio::spawn(scheduler.start());

    // Create app state
    let app_state = price_tracker::api::AppState::new(product_service, engine);

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/products",
            post(price_tracker::api::product::register).get(price_tracker::api::product::list_products)
        )
        .route("/api/products/{id}", get(price_tracker::api::product::get_product))
        .route(
            "/api/products/{id}/deactivate",
            post(price_tracker::api::product::deactivate)
        )
        .route("/api/check", post(price_tracker::api::check::run_check))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| price_tracker::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| price_tracker::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
