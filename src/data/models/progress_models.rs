use chrono::NaiveDateTime;
use diesel::{Queryable, Selectable};
use serde::Serialize;

use crate::schema::lesson_progress;

/// Coarse per-lesson counters kept by the progress tracker, written
/// alongside (never inside) the review recorder's upsert.
#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = lesson_progress)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LessonProgress {
    pub user_id: i32,
    pub lesson_id: i32,
    pub reviews_total: i32,
    pub reviews_correct: i32,
    pub updated_at: NaiveDateTime,
}
