use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::data::models::{DueReview, Item, ReviewState};
use crate::schema::{items, review_states};

use super::algorithm::{self, SrsState};
use super::error::ReviewError;
use super::quality::Quality;

pub const DEFAULT_DUE_LIMIT: i64 = 30;
pub const MAX_DUE_LIMIT: i64 = 100;

/// One initial try plus one reload-and-retry round.
const WRITE_ATTEMPTS: usize = 2;

/// The SRS engine: the single write path for review state and the read
/// path for the due queue. Pure scheduling arithmetic lives in
/// [`algorithm`]; this type owns the load -> compute -> persist cycle.
pub struct SrsEngine<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SrsEngine<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        SrsEngine { conn }
    }

    /// Records one review for `(user_id, item_id)` and returns the persisted
    /// row. Every caller (quiz grading and direct flashcard rating) funnels
    /// through here.
    pub fn record_review(
        &mut self,
        user_id: i32,
        item_id: i32,
        quality: Quality,
    ) -> Result<ReviewState, ReviewError> {
        self.record_review_at(user_id, item_id, quality, Utc::now().naive_utc())
    }

    /// Like [`record_review`](Self::record_review) with an explicit clock.
    ///
    /// Creation races are absorbed by the conflict-tolerant insert; updates
    /// are compare-and-swap on the row's `version`, so two overlapping
    /// reviews of the same item cannot silently lose one write.
    pub fn record_review_at(
        &mut self,
        user_id: i32,
        item_id: i32,
        quality: Quality,
        now: NaiveDateTime,
    ) -> Result<ReviewState, ReviewError> {
        for _ in 0..WRITE_ATTEMPTS {
            match self.load(user_id, item_id)? {
                None => {
                    let next = algorithm::next_state(&SrsState::new_item(), quality);
                    let row = ReviewState::first_review(user_id, item_id, &next, quality, now);

                    let inserted = diesel::insert_into(review_states::table)
                        .values(&row)
                        .on_conflict((review_states::user_id, review_states::item_id))
                        .do_nothing()
                        .execute(self.conn)?;

                    if inserted == 1 {
                        return Ok(row);
                    }
                    // Lost the first-review race; reload and take the
                    // update path.
                }
                Some(prior) => {
                    let next = algorithm::next_state(&prior.srs_state(), quality);
                    let updated_row = prior.advanced(&next, quality, now);

                    let updated = diesel::update(
                        review_states::table
                            .filter(review_states::user_id.eq(user_id))
                            .filter(review_states::item_id.eq(item_id))
                            .filter(review_states::version.eq(prior.version)),
                    )
                    .set((
                        review_states::ease_factor.eq(updated_row.ease_factor),
                        review_states::repetitions.eq(updated_row.repetitions),
                        review_states::interval_days.eq(updated_row.interval_days),
                        review_states::correct_attempts.eq(updated_row.correct_attempts),
                        review_states::wrong_attempts.eq(updated_row.wrong_attempts),
                        review_states::last_reviewed.eq(updated_row.last_reviewed),
                        review_states::next_review.eq(updated_row.next_review),
                        review_states::version.eq(updated_row.version),
                    ))
                    .execute(self.conn)?;

                    if updated == 1 {
                        return Ok(updated_row);
                    }
                    log::warn!(
                        "concurrent review write for user {} item {}, retrying",
                        user_id,
                        item_id
                    );
                }
            }
        }

        Err(ReviewError::WriteConflict { user_id, item_id })
    }

    /// The stored state for one pair, if the item has ever been reviewed.
    pub fn state(
        &mut self,
        user_id: i32,
        item_id: i32,
    ) -> Result<Option<ReviewState>, ReviewError> {
        self.load(user_id, item_id)
    }

    /// Items due for review: `next_review <= now`, earliest due first,
    /// never more than `limit` rows, joined with item content for display.
    pub fn due_reviews(&mut self, user_id: i32, limit: i64) -> Result<Vec<DueReview>, ReviewError> {
        self.due_reviews_at(user_id, limit, Utc::now().naive_utc())
    }

    pub fn due_reviews_at(
        &mut self,
        user_id: i32,
        limit: i64,
        now: NaiveDateTime,
    ) -> Result<Vec<DueReview>, ReviewError> {
        let rows = review_states::table
            .inner_join(items::table)
            .filter(review_states::user_id.eq(user_id))
            .filter(review_states::next_review.le(now))
            .order(review_states::next_review.asc())
            .limit(limit.clamp(1, MAX_DUE_LIMIT))
            .select((ReviewState::as_select(), Item::as_select()))
            .load::<(ReviewState, Item)>(self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(state, item)| DueReview { state, item })
            .collect())
    }

    fn load(&mut self, user_id: i32, item_id: i32) -> Result<Option<ReviewState>, ReviewError> {
        review_states::table
            .filter(review_states::user_id.eq(user_id))
            .filter(review_states::item_id.eq(item_id))
            .select(ReviewState::as_select())
            .first(self.conn)
            .optional()
            .map_err(ReviewError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::db::MIGRATIONS;
    use crate::data::models::KIND_QUESTION;
    use crate::data::repositories::CatalogRepository;
    use chrono::{Duration, NaiveDate};
    use diesel::Connection;
    use diesel_migrations::MigrationHarness;

    fn test_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.run_pending_migrations(MIGRATIONS).unwrap();
        conn
    }

    fn day(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + Duration::days(offset)
    }

    fn q(value: i32) -> Quality {
        Quality::new(value).unwrap()
    }

    fn seed_item(conn: &mut SqliteConnection) -> i32 {
        let options = vec!["a".to_string(), "b".to_string()];
        CatalogRepository::add_item(conn, 1, KIND_QUESTION, "2 + 2?", Some(&options), "b")
            .unwrap()
            .item_id
    }

    #[test]
    fn first_review_creates_row_with_defaults_applied() {
        let mut conn = test_conn();
        let item_id = seed_item(&mut conn);

        let state = SrsEngine::new(&mut conn)
            .record_review_at(7, item_id, q(4), day(0))
            .unwrap();

        assert_eq!(state.repetitions, 1);
        assert_eq!(state.interval_days, 1);
        assert!((state.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(state.correct_attempts, 1);
        assert_eq!(state.wrong_attempts, 0);
        assert_eq!(state.last_reviewed, day(0));
        assert_eq!(state.next_review, day(1));
        assert_eq!(state.version, 0);

        let stored = SrsEngine::new(&mut conn).state(7, item_id).unwrap().unwrap();
        assert_eq!(stored, state);
    }

    #[test]
    fn three_passes_then_lapse_follow_the_recurrence() {
        let mut conn = test_conn();
        let item_id = seed_item(&mut conn);
        let mut engine = SrsEngine::new(&mut conn);

        let first = engine.record_review_at(7, item_id, q(4), day(0)).unwrap();
        assert_eq!((first.repetitions, first.interval_days), (1, 1));

        let second = engine.record_review_at(7, item_id, q(4), day(1)).unwrap();
        assert_eq!((second.repetitions, second.interval_days), (2, 6));

        let third = engine.record_review_at(7, item_id, q(4), day(7)).unwrap();
        assert_eq!((third.repetitions, third.interval_days), (3, 15));
        assert_eq!(third.next_review, day(22));

        let lapsed = engine.record_review_at(7, item_id, q(0), day(8)).unwrap();
        assert_eq!((lapsed.repetitions, lapsed.interval_days), (0, 1));
        assert!(lapsed.ease_factor < third.ease_factor);
        assert_eq!(lapsed.correct_attempts, 3);
        assert_eq!(lapsed.wrong_attempts, 1);
        assert_eq!(lapsed.version, 3);
    }

    #[test]
    fn due_queue_is_filtered_ordered_and_bounded() {
        let mut conn = test_conn();
        let a = seed_item(&mut conn);
        let b = seed_item(&mut conn);
        let c = seed_item(&mut conn);
        let d = seed_item(&mut conn);
        let mut engine = SrsEngine::new(&mut conn);

        // next_review lands one day after each recording.
        engine.record_review_at(7, a, q(4), day(-3)).unwrap();
        engine.record_review_at(7, b, q(4), day(-5)).unwrap();
        engine.record_review_at(7, c, q(4), day(-1)).unwrap();
        // Not yet due.
        engine.record_review_at(7, d, q(4), day(0)).unwrap();
        // Another user's state never leaks in.
        engine.record_review_at(8, a, q(4), day(-9)).unwrap();

        let due = engine.due_reviews_at(7, 10, day(0)).unwrap();
        let ids: Vec<i32> = due.iter().map(|d| d.state.item_id).collect();
        assert_eq!(ids, vec![b, a, c]);
        assert!(due.iter().all(|d| d.state.user_id == 7));
        assert!(due.iter().all(|d| d.state.next_review <= day(0)));

        let bounded = engine.due_reviews_at(7, 2, day(0)).unwrap();
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].state.item_id, b);
    }

    #[test]
    fn due_queue_carries_item_content() {
        let mut conn = test_conn();
        let item_id = seed_item(&mut conn);
        let mut engine = SrsEngine::new(&mut conn);
        engine.record_review_at(7, item_id, q(4), day(-2)).unwrap();

        let due = engine.due_reviews_at(7, 10, day(0)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].item.prompt, "2 + 2?");
        assert_eq!(due[0].item.option_list(), vec!["a", "b"]);
    }

    #[test]
    fn updates_are_compare_and_swap_on_version() {
        let mut conn = test_conn();
        let item_id = seed_item(&mut conn);

        SrsEngine::new(&mut conn)
            .record_review_at(7, item_id, q(4), day(0))
            .unwrap();
        let second = SrsEngine::new(&mut conn)
            .record_review_at(7, item_id, q(4), day(1))
            .unwrap();
        assert_eq!(second.version, 1);

        // A write against a stale version touches nothing.
        let stale = diesel::update(
            review_states::table
                .filter(review_states::user_id.eq(7))
                .filter(review_states::item_id.eq(item_id))
                .filter(review_states::version.eq(0)),
        )
        .set(review_states::repetitions.eq(99))
        .execute(&mut conn)
        .unwrap();
        assert_eq!(stale, 0);

        let stored = SrsEngine::new(&mut conn).state(7, item_id).unwrap().unwrap();
        assert_eq!(stored.repetitions, 2);
    }

    #[test]
    fn unreviewed_pair_has_no_state() {
        let mut conn = test_conn();
        let item_id = seed_item(&mut conn);
        assert!(SrsEngine::new(&mut conn).state(7, item_id).unwrap().is_none());
    }
}
