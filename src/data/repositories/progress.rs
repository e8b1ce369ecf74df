use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::data::models::LessonProgress;
use crate::schema::lesson_progress;

/// Coarse per-lesson completion counters. This is a sibling write the
/// review handlers perform next to the recorder's upsert; the recorder
/// itself never calls it, and a failure here must not fail the review.
pub struct ProgressTracker;

impl ProgressTracker {
    pub fn record_completion(
        conn: &mut SqliteConnection,
        user_id: i32,
        lesson_id: i32,
        correct: bool,
    ) -> Result<(), diesel::result::Error> {
        Self::record_completion_at(conn, user_id, lesson_id, correct, Utc::now().naive_utc())
    }

    pub fn record_completion_at(
        conn: &mut SqliteConnection,
        user_id: i32,
        lesson_id: i32,
        correct: bool,
        now: NaiveDateTime,
    ) -> Result<(), diesel::result::Error> {
        let correct_increment = if correct { 1 } else { 0 };

        diesel::insert_into(lesson_progress::table)
            .values((
                lesson_progress::user_id.eq(user_id),
                lesson_progress::lesson_id.eq(lesson_id),
                lesson_progress::reviews_total.eq(1),
                lesson_progress::reviews_correct.eq(correct_increment),
                lesson_progress::updated_at.eq(now),
            ))
            .on_conflict((lesson_progress::user_id, lesson_progress::lesson_id))
            .do_update()
            .set((
                lesson_progress::reviews_total.eq(lesson_progress::reviews_total + 1),
                lesson_progress::reviews_correct
                    .eq(lesson_progress::reviews_correct + correct_increment),
                lesson_progress::updated_at.eq(now),
            ))
            .execute(conn)?;

        Ok(())
    }

    pub fn for_user(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<LessonProgress>, diesel::result::Error> {
        lesson_progress::table
            .filter(lesson_progress::user_id.eq(user_id))
            .order(lesson_progress::lesson_id.asc())
            .select(LessonProgress::as_select())
            .load(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::db::MIGRATIONS;
    use diesel::Connection;
    use diesel_migrations::MigrationHarness;

    fn test_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.run_pending_migrations(MIGRATIONS).unwrap();
        conn
    }

    #[test]
    fn counters_accumulate_across_reviews() {
        let mut conn = test_conn();
        let now = Utc::now().naive_utc();

        ProgressTracker::record_completion_at(&mut conn, 1, 10, true, now).unwrap();
        ProgressTracker::record_completion_at(&mut conn, 1, 10, false, now).unwrap();
        ProgressTracker::record_completion_at(&mut conn, 1, 10, true, now).unwrap();
        ProgressTracker::record_completion_at(&mut conn, 1, 11, false, now).unwrap();

        let rows = ProgressTracker::for_user(&mut conn, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].lesson_id, 10);
        assert_eq!(rows[0].reviews_total, 3);
        assert_eq!(rows[0].reviews_correct, 2);
        assert_eq!(rows[1].lesson_id, 11);
        assert_eq!(rows[1].reviews_total, 1);
        assert_eq!(rows[1].reviews_correct, 0);
    }

    #[test]
    fn counters_are_per_user() {
        let mut conn = test_conn();
        let now = Utc::now().naive_utc();

        ProgressTracker::record_completion_at(&mut conn, 1, 10, true, now).unwrap();
        ProgressTracker::record_completion_at(&mut conn, 2, 10, true, now).unwrap();

        assert_eq!(ProgressTracker::for_user(&mut conn, 1).unwrap().len(), 1);
        assert_eq!(ProgressTracker::for_user(&mut conn, 2).unwrap().len(), 1);
    }
}
