use serde::{Deserialize, Serialize};

use super::error::ReviewError;

/// Grades below this threshold count as a lapse and reset the streak.
pub const PASS_THRESHOLD: u8 = 3;

/// A recall grade in 0-5, validated at construction so out-of-range values
/// never reach the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i32) -> Result<Self, ReviewError> {
        if (0..=5).contains(&value) {
            Ok(Quality(value as u8))
        } else {
            Err(ReviewError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_lapse(self) -> bool {
        self.0 < PASS_THRESHOLD
    }

    /// Quiz-grading path: a correct answer grades as 4 ("good"), an
    /// incorrect one as 2 (a lapse, but not a blackout).
    pub fn from_correct(correct: bool) -> Self {
        if correct { Quality(4) } else { Quality(2) }
    }
}

/// The four flashcard review buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl From<SelfRating> for Quality {
    fn from(rating: SelfRating) -> Self {
        match rating {
            SelfRating::Again => Quality(0),
            SelfRating::Hard => Quality(3),
            SelfRating::Good => Quality(4),
            SelfRating::Easy => Quality(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_grade_range() {
        for value in 0..=5 {
            assert_eq!(Quality::new(value).unwrap().value(), value as u8);
        }
    }

    #[test]
    fn rejects_out_of_range_grades() {
        assert!(Quality::new(-1).is_err());
        assert!(Quality::new(6).is_err());
    }

    #[test]
    fn lapse_threshold_is_three() {
        assert!(Quality::new(0).unwrap().is_lapse());
        assert!(Quality::new(2).unwrap().is_lapse());
        assert!(!Quality::new(3).unwrap().is_lapse());
        assert!(!Quality::new(5).unwrap().is_lapse());
    }

    #[test]
    fn correctness_maps_to_four_and_two() {
        assert_eq!(Quality::from_correct(true).value(), 4);
        assert_eq!(Quality::from_correct(false).value(), 2);
        assert!(Quality::from_correct(false).is_lapse());
    }

    #[test]
    fn rating_buttons_map_to_qualities() {
        assert_eq!(Quality::from(SelfRating::Again).value(), 0);
        assert_eq!(Quality::from(SelfRating::Hard).value(), 3);
        assert_eq!(Quality::from(SelfRating::Good).value(), 4);
        assert_eq!(Quality::from(SelfRating::Easy).value(), 5);
    }
}
