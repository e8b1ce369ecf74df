use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::data::db::DbPool;
use crate::data::models::{
    ApiResponse, CreateItemRequest, CreateLessonRequest, Item, KIND_FLASHCARD, KIND_QUESTION,
    Lesson, LessonWithItems,
};
use crate::data::repositories::CatalogRepository;
use crate::utils;

pub fn catalog_router(pool: DbPool) -> Router {
    Router::new()
        .route("/", get(list_lessons).post(create_lesson))
        .route("/{lesson_id}", get(view_lesson).delete(delete_lesson))
        .route("/{lesson_id}/items", post(add_item))
        .with_state(pool)
}

async fn current_user(
    session: &tower_sessions::Session,
) -> Result<i32, (StatusCode, String)> {
    utils::current_user_id(session)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, "Not logged in".to_string()))
}

fn db_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", e),
    )
}

pub async fn list_lessons(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<Lesson>>, (StatusCode, String)> {
    let user_id = current_user(&session).await?;
    let mut conn = pool.get().map_err(db_error)?;

    let lessons = CatalogRepository::list_lessons(&mut conn, user_id).map_err(db_error)?;
    Ok(Json(lessons))
}

pub async fn create_lesson(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<Json<Lesson>, (StatusCode, String)> {
    let user_id = current_user(&session).await?;
    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut conn = pool.get().map_err(db_error)?;
    let lesson =
        CatalogRepository::create_lesson(&mut conn, user_id, &payload.title).map_err(db_error)?;
    Ok(Json(lesson))
}

pub async fn view_lesson(
    Path(lesson_id): Path<i32>,
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<LessonWithItems>, (StatusCode, String)> {
    let user_id = current_user(&session).await?;
    let mut conn = pool.get().map_err(db_error)?;

    let lesson = CatalogRepository::find_lesson(&mut conn, lesson_id, user_id)
        .map_err(db_error)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Lesson not found or access denied".to_string(),
        ))?;

    let items = CatalogRepository::lesson_items(&mut conn, lesson_id).map_err(db_error)?;
    Ok(Json(LessonWithItems {
        lesson_id: lesson.lesson_id,
        title: lesson.title,
        items,
    }))
}

pub async fn delete_lesson(
    Path(lesson_id): Path<i32>,
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    let user_id = current_user(&session).await?;
    let mut conn = pool.get().map_err(db_error)?;

    if CatalogRepository::find_lesson(&mut conn, lesson_id, user_id)
        .map_err(db_error)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Lesson not found".to_string()));
    }

    CatalogRepository::delete_lesson(&mut conn, lesson_id).map_err(db_error)?;

    Ok(Json(ApiResponse {
        success: true,
        message: "Lesson deleted successfully".to_string(),
    }))
}

pub async fn add_item(
    Path(lesson_id): Path<i32>,
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<CreateItemRequest>,
) -> Result<Json<Item>, (StatusCode, String)> {
    let user_id = current_user(&session).await?;
    payload
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if payload.kind != KIND_QUESTION && payload.kind != KIND_FLASHCARD {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Unknown item kind: {}", payload.kind),
        ));
    }
    if payload.kind == KIND_QUESTION
        && payload.options.as_ref().is_none_or(|options| options.len() < 2)
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "Questions need at least two options".to_string(),
        ));
    }

    let mut conn = pool.get().map_err(db_error)?;

    if CatalogRepository::find_lesson(&mut conn, lesson_id, user_id)
        .map_err(db_error)?
        .is_none()
    {
        return Err((
            StatusCode::NOT_FOUND,
            "Lesson not found or access denied".to_string(),
        ));
    }

    let item = CatalogRepository::add_item(
        &mut conn,
        lesson_id,
        &payload.kind,
        &payload.prompt,
        payload.options.as_deref(),
        &payload.answer,
    )
    .map_err(db_error)?;

    Ok(Json(item))
}
