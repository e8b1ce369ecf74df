use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use tower_sessions::Session;

use crate::data::db::DbPool;
use crate::data::models::{
    AnswerOutcome, AnswerRequest, CardView, DueQuery, DueReview, LessonProgress, RateRequest,
    ReviewState, StartStudyRequest, StudyView,
};
use crate::data::repositories::{CatalogRepository, ProgressTracker};
use crate::srs::engine::{DEFAULT_DUE_LIMIT, MAX_DUE_LIMIT};
use crate::srs::{DeckEntry, Phase, Quality, ReviewError, ReviewSession, SrsEngine};
use crate::utils;

const STUDY_SESSION_KEY: &str = "study_session";

pub fn review_router(pool: DbPool) -> Router {
    Router::new()
        .route("/due", get(due_queue))
        .route("/{item_id}", get(item_state).post(rate_item))
        .with_state(pool)
}

pub fn study_router(pool: DbPool) -> Router {
    Router::new()
        .route("/start", post(start_session))
        .route("/answer", post(submit_answer))
        .route("/retry", post(retry_session))
        .with_state(pool)
}

pub fn progress_router(pool: DbPool) -> Router {
    Router::new()
        .route("/", get(progress_overview))
        .with_state(pool)
}

async fn require_user(session: &Session) -> Result<i32, ReviewError> {
    utils::current_user_id(session)
        .await
        .ok_or(ReviewError::Unauthorized)
}

fn checkout(
    pool: &DbPool,
) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, ReviewError> {
    pool.get().map_err(|e| ReviewError::Unavailable(e.to_string()))
}

fn resolve_limit(limit: Option<i64>) -> Result<i64, ReviewError> {
    match limit {
        None => Ok(DEFAULT_DUE_LIMIT),
        Some(l) if (1..=MAX_DUE_LIMIT).contains(&l) => Ok(l),
        Some(l) => Err(ReviewError::InvalidLimit(l)),
    }
}

/// GET /api/review/due - the ordered, bounded due queue.
async fn due_queue(
    State(pool): State<DbPool>,
    session: Session,
    Query(params): Query<DueQuery>,
) -> Result<Json<Vec<DueReview>>, ReviewError> {
    let user_id = require_user(&session).await?;
    let limit = resolve_limit(params.limit)?;

    let mut conn = checkout(&pool)?;
    let due = SrsEngine::new(&mut conn).due_reviews(user_id, limit)?;
    Ok(Json(due))
}

/// GET /api/review/{item_id} - the stored state for one pair, if any.
async fn item_state(
    State(pool): State<DbPool>,
    session: Session,
    Path(item_id): Path<i32>,
) -> Result<Json<ReviewState>, ReviewError> {
    let user_id = require_user(&session).await?;
    let mut conn = checkout(&pool)?;
    let state = SrsEngine::new(&mut conn)
        .state(user_id, item_id)?
        .ok_or(ReviewError::UnknownItem(item_id))?;
    Ok(Json(state))
}

/// POST /api/review/{item_id} - record a flashcard self-rating.
async fn rate_item(
    State(pool): State<DbPool>,
    session: Session,
    Path(item_id): Path<i32>,
    Json(req): Json<RateRequest>,
) -> Result<Json<ReviewState>, ReviewError> {
    let user_id = require_user(&session).await?;
    let quality = req.quality()?;

    let mut conn = checkout(&pool)?;
    let item = CatalogRepository::find_item(&mut conn, item_id)?
        .ok_or(ReviewError::UnknownItem(item_id))?;

    let state = SrsEngine::new(&mut conn).record_review(user_id, item_id, quality)?;
    notify_progress(&mut conn, user_id, item.lesson_id, !quality.is_lapse());

    Ok(Json(state))
}

/// POST /api/study/start - build a deck from due questions and deal the
/// first card.
async fn start_session(
    State(pool): State<DbPool>,
    session: Session,
    payload: Option<Json<StartStudyRequest>>,
) -> Result<Json<StudyView>, ReviewError> {
    let user_id = require_user(&session).await?;
    let limit = resolve_limit(payload.and_then(|Json(req)| req.limit))?;

    let mut conn = checkout(&pool)?;
    let deck: Vec<DeckEntry> = SrsEngine::new(&mut conn)
        .due_reviews(user_id, limit)?
        .into_iter()
        .filter(|due| due.item.is_question())
        .map(|due| DeckEntry {
            item_id: due.state.item_id,
            lesson_id: due.item.lesson_id,
        })
        .collect();

    let machine = ReviewSession::start(deck);
    let view = study_view(&mut conn, &machine)?;
    session.insert(STUDY_SESSION_KEY, &machine).await?;
    Ok(Json(view))
}

/// POST /api/study/answer - grade the current card, record the review,
/// then move the session forward. The machine does not advance unless the
/// write settled, so a failed persist leaves the card answerable again.
async fn submit_answer(
    State(pool): State<DbPool>,
    session: Session,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerOutcome>, ReviewError> {
    let user_id = require_user(&session).await?;
    if req.answer.trim().is_empty() {
        return Err(ReviewError::EmptyAnswer);
    }

    let mut machine: ReviewSession = session
        .get(STUDY_SESSION_KEY)
        .await?
        .ok_or(ReviewError::NoActiveSession)?;
    let entry = machine.current().ok_or(ReviewError::NoActiveSession)?;

    let mut conn = checkout(&pool)?;
    let item = CatalogRepository::find_item(&mut conn, entry.item_id)?
        .ok_or(ReviewError::UnknownItem(entry.item_id))?;

    let correct = item.grade(&req.answer);
    let state =
        SrsEngine::new(&mut conn).record_review(user_id, entry.item_id, Quality::from_correct(correct))?;
    notify_progress(&mut conn, user_id, entry.lesson_id, correct);

    machine.answer(req.answer, correct)?;
    machine.advance()?;

    let next = study_view(&mut conn, &machine)?;
    session.insert(STUDY_SESSION_KEY, &machine).await?;

    Ok(Json(AnswerOutcome {
        correct,
        correct_answer: item.answer,
        state,
        next,
    }))
}

/// POST /api/study/retry - re-present the finished deck. Reviews recorded
/// during the previous pass are not undone.
async fn retry_session(
    State(pool): State<DbPool>,
    session: Session,
) -> Result<Json<StudyView>, ReviewError> {
    require_user(&session).await?;

    let mut machine: ReviewSession = session
        .get(STUDY_SESSION_KEY)
        .await?
        .ok_or(ReviewError::NoActiveSession)?;
    machine.retry()?;

    let mut conn = checkout(&pool)?;
    let view = study_view(&mut conn, &machine)?;
    session.insert(STUDY_SESSION_KEY, &machine).await?;
    Ok(Json(view))
}

/// GET /api/progress - the caller's per-lesson counters.
async fn progress_overview(
    State(pool): State<DbPool>,
    session: Session,
) -> Result<Json<Vec<LessonProgress>>, ReviewError> {
    let user_id = require_user(&session).await?;
    let mut conn = checkout(&pool)?;
    let progress = ProgressTracker::for_user(&mut conn, user_id)?;
    Ok(Json(progress))
}

/// The progress tracker is a sibling write: its failure is logged, never
/// turned into a failed review.
fn notify_progress(conn: &mut SqliteConnection, user_id: i32, lesson_id: i32, correct: bool) {
    if let Err(e) = ProgressTracker::record_completion(conn, user_id, lesson_id, correct) {
        log::error!(
            "progress update failed for user {} lesson {}: {}",
            user_id,
            lesson_id,
            e
        );
    }
}

fn study_view(conn: &mut SqliteConnection, machine: &ReviewSession) -> Result<StudyView, ReviewError> {
    match machine.phase() {
        Phase::Active { index } => {
            let entry = machine.current().ok_or(ReviewError::NoActiveSession)?;
            let item = CatalogRepository::find_item(conn, entry.item_id)?
                .ok_or(ReviewError::UnknownItem(entry.item_id))?;
            let options = item.option_list();
            Ok(StudyView::Active {
                card: CardView {
                    item_id: item.item_id,
                    prompt: item.prompt,
                    options,
                    position: index + 1,
                    total: machine.len(),
                },
            })
        }
        Phase::Completed { correct, total } => Ok(StudyView::Completed {
            correct: *correct,
            total: *total,
            score: machine.score(),
        }),
        Phase::Idle | Phase::Answered { .. } => Err(ReviewError::NoActiveSession),
    }
}
