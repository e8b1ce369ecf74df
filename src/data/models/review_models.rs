use chrono::{Duration, NaiveDateTime};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::schema::review_states;
use crate::srs::algorithm::SrsState;
use crate::srs::error::ReviewError;
use crate::srs::quality::{Quality, SelfRating};

use super::catalog_models::Item;

/// Per-(user, item) memory state. One row per pair, keyed naturally;
/// `version` is the optimistic-concurrency token checked on every update.
#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = review_states)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewState {
    pub user_id: i32,
    pub item_id: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub interval_days: i32,
    pub correct_attempts: i32,
    pub wrong_attempts: i32,
    pub last_reviewed: NaiveDateTime,
    pub next_review: NaiveDateTime,
    pub version: i32,
}

impl ReviewState {
    /// The scheduler's slice of this row.
    pub fn srs_state(&self) -> SrsState {
        SrsState {
            ease_factor: self.ease_factor,
            repetitions: self.repetitions,
            interval_days: self.interval_days,
        }
    }

    /// Row for an item's first review by a user.
    pub fn first_review(
        user_id: i32,
        item_id: i32,
        next: &SrsState,
        quality: Quality,
        now: NaiveDateTime,
    ) -> Self {
        ReviewState {
            user_id,
            item_id,
            ease_factor: next.ease_factor,
            repetitions: next.repetitions,
            interval_days: next.interval_days,
            correct_attempts: if quality.is_lapse() { 0 } else { 1 },
            wrong_attempts: if quality.is_lapse() { 1 } else { 0 },
            last_reviewed: now,
            next_review: now + Duration::days(next.interval_days as i64),
            version: 0,
        }
    }

    /// This row after one more review, with the version bumped.
    pub fn advanced(&self, next: &SrsState, quality: Quality, now: NaiveDateTime) -> Self {
        ReviewState {
            user_id: self.user_id,
            item_id: self.item_id,
            ease_factor: next.ease_factor,
            repetitions: next.repetitions,
            interval_days: next.interval_days,
            correct_attempts: self.correct_attempts + if quality.is_lapse() { 0 } else { 1 },
            wrong_attempts: self.wrong_attempts + if quality.is_lapse() { 1 } else { 0 },
            last_reviewed: now,
            next_review: now + Duration::days(next.interval_days as i64),
            version: self.version + 1,
        }
    }
}

/// A due row joined with the item it schedules.
#[derive(Serialize, Debug)]
pub struct DueReview {
    pub state: ReviewState,
    pub item: Item,
}

#[derive(Deserialize)]
pub struct DueQuery {
    pub limit: Option<i64>,
}

/// Flashcard rating payload: either a named button or a raw 0-5 grade.
#[derive(Deserialize)]
pub struct RateRequest {
    pub rating: Option<SelfRating>,
    pub quality: Option<i32>,
}

impl RateRequest {
    pub fn quality(&self) -> Result<Quality, ReviewError> {
        match (self.rating, self.quality) {
            (Some(rating), _) => Ok(Quality::from(rating)),
            (None, Some(raw)) => Quality::new(raw),
            (None, None) => Err(ReviewError::MissingRating),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct StartStudyRequest {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Serialize)]
pub struct CardView {
    pub item_id: i32,
    pub prompt: String,
    pub options: Vec<String>,
    pub position: usize,
    pub total: usize,
}

/// What the study client sees after start/answer/retry.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudyView {
    Active { card: CardView },
    Completed { correct: usize, total: usize, score: f64 },
}

#[derive(Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub state: ReviewState,
    pub next: StudyView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_request_prefers_named_rating() {
        let req = RateRequest { rating: Some(SelfRating::Easy), quality: Some(1) };
        assert_eq!(req.quality().unwrap().value(), 5);
    }

    #[test]
    fn rate_request_validates_raw_grade() {
        let req = RateRequest { rating: None, quality: Some(7) };
        assert!(req.quality().is_err());
        let req = RateRequest { rating: None, quality: None };
        assert!(matches!(req.quality(), Err(ReviewError::MissingRating)));
    }
}
