use anyhow::Context as _;
use axum::{
    Router,
    extract::Extension,
    response::IntoResponse,
    routing::{get, get_service},
};
use std::sync::Arc;
use tera::{Context, Tera};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

mod data;
mod features;
mod handlers;
mod schema;
mod srs;
mod utils;

use crate::data::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration
    dotenv::dotenv().ok();
    env_logger::init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tutorium.db".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into());

    // Database pool (runs pending migrations)
    let pool = db::build_pool(&database_url).context("failed to initialize database")?;

    // Templates
    let templates = Arc::new(Tera::new("templates/**/*.html").context("template parsing error")?);

    // Sessions
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_secure(false);

    // API routers
    let api_router = Router::new()
        .nest("/lessons", handlers::catalog::catalog_router(pool.clone()))
        .nest("/review", handlers::review::review_router(pool.clone()))
        .nest("/study", handlers::review::study_router(pool.clone()))
        .nest("/progress", handlers::review::progress_router(pool.clone()))
        .nest("/search", handlers::search::search_router(pool.clone()));

    // Auth router
    let auth_router = Router::new()
        .merge(handlers::auth::login::auth_router(
            pool.clone(),
            templates.clone(),
        ))
        .merge(handlers::auth::register::auth_router(
            pool.clone(),
            templates.clone(),
        ))
        .route("/logout", get(handlers::auth::handle_logout));

    // Main application router
    let app = Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/study", get(study_page))
        .nest("/auth", auth_router)
        .nest("/api", api_router)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(Extension(templates))
        .layer(session_layer);

    // Start server
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;

    log::info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

// Handlers for page shells
async fn home(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "index.html", Context::new())
}

async fn dashboard(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "dashboard.html", Context::new())
}

async fn study_page(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "study.html", Context::new())
}
