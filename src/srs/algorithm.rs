use super::quality::Quality;

pub const INITIAL_EASE: f64 = 2.5;
pub const MIN_EASE: f64 = 1.3;

/// The scheduler's view of one (user, item) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrsState {
    pub ease_factor: f64,
    pub repetitions: i32,
    pub interval_days: i32,
}

impl SrsState {
    /// Starting point for an item that has never been reviewed.
    pub fn new_item() -> Self {
        SrsState {
            ease_factor: INITIAL_EASE,
            repetitions: 0,
            interval_days: 0,
        }
    }
}

/// One step of the SM-2 recurrence.
///
/// A lapse (quality < 3) resets the streak to a one-day interval. A pass
/// extends it: 1 day, then 6, then the prior interval multiplied by the
/// prior ease factor. The ease factor is adjusted on both branches and
/// never drops below 1.3. Pure arithmetic; the caller owns timestamps and
/// persistence.
pub fn next_state(prior: &SrsState, quality: Quality) -> SrsState {
    let (repetitions, interval_days) = if quality.is_lapse() {
        (0, 1)
    } else {
        let repetitions = prior.repetitions + 1;
        let interval_days = match repetitions {
            1 => 1,
            2 => 6,
            _ => ((prior.interval_days as f64 * prior.ease_factor).round() as i32).max(1),
        };
        (repetitions, interval_days)
    };

    let q = quality.value() as f64;
    let ease_factor = prior.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));

    SrsState {
        ease_factor: ease_factor.max(MIN_EASE),
        repetitions,
        interval_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(value: i32) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn first_pass_gives_one_day() {
        let next = next_state(&SrsState::new_item(), q(4));
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.interval_days, 1);
        // 0.1 - (5 - 4) * (0.08 + 0.02) = 0
        assert!((next.ease_factor - 2.5).abs() < 1e-9);
    }

    #[test]
    fn second_pass_gives_six_days_regardless_of_ease() {
        for ease in [1.3, 2.0, 2.5, 3.4] {
            let prior = SrsState { ease_factor: ease, repetitions: 1, interval_days: 1 };
            let next = next_state(&prior, q(3));
            assert_eq!(next.repetitions, 2);
            assert_eq!(next.interval_days, 6);
        }
    }

    #[test]
    fn third_pass_multiplies_by_prior_ease() {
        let prior = SrsState { ease_factor: 2.5, repetitions: 2, interval_days: 6 };
        let next = next_state(&prior, q(4));
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.interval_days, 15);
    }

    #[test]
    fn growth_interval_never_drops_below_one_day() {
        let prior = SrsState { ease_factor: 1.3, repetitions: 7, interval_days: 0 };
        let next = next_state(&prior, q(5));
        assert_eq!(next.interval_days, 1);
    }

    #[test]
    fn any_lapse_resets_streak_and_interval() {
        for quality in 0..3 {
            let prior = SrsState { ease_factor: 2.7, repetitions: 9, interval_days: 120 };
            let next = next_state(&prior, q(quality));
            assert_eq!(next.repetitions, 0);
            assert_eq!(next.interval_days, 1);
        }
    }

    #[test]
    fn ease_is_monotone_in_quality() {
        let prior = SrsState { ease_factor: 2.5, repetitions: 3, interval_days: 15 };
        for quality in 0..5 {
            let lower = next_state(&prior, q(quality));
            let higher = next_state(&prior, q(quality + 1));
            assert!(lower.ease_factor <= higher.ease_factor);
        }
    }

    #[test]
    fn ease_never_falls_below_floor() {
        let mut state = SrsState::new_item();
        for _ in 0..50 {
            state = next_state(&state, q(0));
            assert!(state.ease_factor >= MIN_EASE);
        }
        assert!((state.ease_factor - MIN_EASE).abs() < 1e-9);
    }

    #[test]
    fn step_is_deterministic() {
        let prior = SrsState { ease_factor: 2.18, repetitions: 4, interval_days: 37 };
        assert_eq!(next_state(&prior, q(5)), next_state(&prior, q(5)));
    }
}
