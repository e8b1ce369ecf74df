use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};

use crate::data::db::DbPool;
use crate::data::models::{SearchParams, SearchResult};
use crate::data::repositories::CatalogRepository;
use crate::features::search::SearchEngine;
use crate::utils;

const DEFAULT_RESULTS: usize = 15;
const MAX_RESULTS: usize = 50;

pub fn search_router(pool: DbPool) -> Router {
    Router::new().route("/", get(search_api)).with_state(pool)
}

pub async fn search_api(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, (StatusCode, String)> {
    let user_id = utils::current_user_id(&session)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, "Not logged in".to_string()))?;

    let mut conn = pool.get().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;

    let items = CatalogRepository::user_items(&mut conn, user_id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        )
    })?;

    let limit = params.limit.unwrap_or(DEFAULT_RESULTS).min(MAX_RESULTS);
    let results = SearchEngine::search_items(&params.q, &items, limit);

    Ok(Json(SearchResult {
        query: params.q,
        results,
    }))
}
