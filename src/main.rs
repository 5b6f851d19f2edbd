//! Atelier Server - Maintenance Management System
//!
//! REST API server for equipment inventory, repair interventions,
//! spare-parts stock and preventive-maintenance schedules.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("atelier_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Atelier Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the database, creating the file on first start
    // The repository layer performs its own referential checks and relies on
    // the engine NOT enforcing foreign keys (see Repository::init_schema);
    // sqlx enables `PRAGMA foreign_keys = ON` by default, so disable it here.
    let connect_options = SqliteConnectOptions::from_str(&config.database.url)
        .expect("Invalid database URL")
        .create_if_missing(true)
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await
        .expect("Failed to open database");

    tracing::info!("Connected to database");

    // Create tables if absent
    let repository = Repository::new(pool);
    repository
        .init_schema()
        .await
        .expect("Failed to initialize database schema");

    tracing::info!("Database schema ready");

    let services = Services::new(repository.clone(), &config);

    // Seed the default admin account on first start; it must change its
    // password at first login
    let admin_hash = services
        .users
        .hash_password(&config.auth.initial_password)
        .expect("Failed to hash initial admin password");
    if repository
        .users_seed_admin(&admin_hash)
        .await
        .expect("Failed to seed admin account")
    {
        tracing::info!("Seeded default admin account (forced password change at first login)");
    }

    // Background reminder scan: once at startup, then periodically
    let reminders = services.reminders.clone();
    tokio::spawn(async move { reminders.run().await });

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/change-password", post(api::auth::change_password))
        .route("/auth/me", get(api::auth::me))
        // Equipment catalog
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment", post(api::equipment::create_equipment))
        .route(
            "/equipment/serial/:serial_number",
            get(api::equipment::get_equipment_by_serial),
        )
        .route("/equipment/:id", get(api::equipment::get_equipment))
        .route("/equipment/:id", put(api::equipment::update_equipment))
        .route(
            "/equipment/:id/interventions",
            get(api::equipment::list_equipment_interventions),
        )
        // Parts inventory
        .route("/parts", get(api::parts::list_parts))
        .route("/parts", post(api::parts::create_part))
        .route("/parts/low-stock", get(api::parts::list_low_stock))
        .route("/parts/:id", get(api::parts::get_part))
        .route("/parts/:id", put(api::parts::update_part))
        .route("/parts/:id", delete(api::parts::delete_part))
        .route("/parts/:id/adjust-stock", post(api::parts::adjust_stock))
        // Interventions
        .route("/interventions", get(api::interventions::list_interventions))
        .route("/interventions", post(api::interventions::create_intervention))
        .route("/interventions/:id", get(api::interventions::get_intervention))
        .route("/interventions/:id", put(api::interventions::update_intervention))
        .route(
            "/interventions/:id",
            delete(api::interventions::delete_intervention),
        )
        // Schedules
        .route("/schedules", get(api::schedules::list_schedules))
        .route("/schedules", post(api::schedules::create_schedule))
        .route("/schedules/upcoming", get(api::schedules::list_upcoming))
        .route("/schedules/:id", get(api::schedules::get_schedule))
        .route("/schedules/:id", put(api::schedules::update_schedule))
        .route("/schedules/:id", delete(api::schedules::delete_schedule))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users", post(api::users::create_user))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id", put(api::users::update_user))
        .route("/users/:id", delete(api::users::delete_user))
        .route("/users/:id/permissions", put(api::users::update_permissions))
        .route("/users/:id/reset-password", post(api::users::reset_password))
        // Settings
        .route("/settings", get(api::settings::get_settings))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
