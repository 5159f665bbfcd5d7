//! SM-2 scheduler for card intervals.
//!
//! Provides the pure interval/ease-factor update applied after each answer,
//! and interval previews for presentation layers.

use chrono::{DateTime, Duration, Utc};

use crate::types::{CardSchedule, QualityRating, MIN_EASE_FACTOR};

/// SM-2 interval scheduler.
///
/// Maps (current schedule, quality rating) to the next schedule. Pure and
/// deterministic: identical inputs always produce identical outputs, and no
/// rating can fail to produce a schedule.
pub struct Sm2Scheduler {
    /// Floor applied to every ease-factor update.
    min_ease_factor: f32,
    /// Interval in days after the first correct recall, and after a lapse.
    first_interval: u32,
    /// Interval in days after the second consecutive correct recall.
    second_interval: u32,
}

impl Sm2Scheduler {
    /// Create a scheduler with standard SM-2 parameters (1 day, 6 days,
    /// ease floor 1.3).
    pub fn new() -> Self {
        Self {
            min_ease_factor: MIN_EASE_FACTOR,
            first_interval: 1,
            second_interval: 6,
        }
    }

    /// Create a scheduler with custom parameters.
    pub fn with_params(min_ease_factor: f32, first_interval: u32, second_interval: u32) -> Self {
        Self {
            min_ease_factor,
            first_interval,
            second_interval,
        }
    }

    /// Compute the schedule resulting from one answer.
    ///
    /// Correct answers (`Good` or better) walk the interval ladder: 1 day,
    /// then 6 days, then `round(interval * ease_factor)`. Incorrect answers
    /// reset to the first step and clear the repetition streak. The ease
    /// factor moves on every answer:
    ///
    /// ```text
    /// ef' = max(floor, ef + (0.1 - (4 - q) * (0.08 + (4 - q) * 0.02)))
    /// ```
    ///
    /// so `Easy` adds 0.10, `Good` holds, `Hard` costs 0.14 and `Again`
    /// costs 0.32, never dropping below the floor.
    ///
    /// # Arguments
    /// * `schedule` - Current card schedule
    /// * `rating` - Quality of recall (Again, Hard, Good, Easy)
    /// * `now` - Current timestamp
    pub fn process_answer(
        &self,
        schedule: &CardSchedule,
        rating: QualityRating,
        now: DateTime<Utc>,
    ) -> CardSchedule {
        let interval_days = self.next_interval(schedule, rating);

        let q = rating.to_rating() as f32;
        let delta = 0.1 - (4.0 - q) * (0.08 + (4.0 - q) * 0.02);
        let ease_factor = (schedule.ease_factor + delta).max(self.min_ease_factor);

        let repetitions = if rating.is_correct() {
            schedule.repetitions + 1
        } else {
            0
        };

        CardSchedule {
            interval_days,
            ease_factor,
            repetitions,
            next_review: now + Duration::days(interval_days as i64),
            last_reviewed: Some(now),
        }
    }

    /// Predict the interval each rating would produce for a schedule.
    ///
    /// Drives "Again 1d / Good 15d" style answer-button labels without
    /// touching any state.
    pub fn preview_intervals(&self, schedule: &CardSchedule) -> [(QualityRating, u32); 4] {
        QualityRating::ALL.map(|rating| (rating, self.next_interval(schedule, rating)))
    }

    fn next_interval(&self, schedule: &CardSchedule, rating: QualityRating) -> u32 {
        let interval = if rating.is_correct() {
            match schedule.repetitions {
                0 => self.first_interval,
                1 => self.second_interval,
                _ => (schedule.interval_days as f32 * schedule.ease_factor).round() as u32,
            }
        } else {
            self.first_interval
        };
        interval.max(1)
    }
}

impl Default for Sm2Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_EASE_FACTOR;
    use rand::Rng;

    fn schedule_with(interval_days: u32, ease_factor: f32, repetitions: u32) -> CardSchedule {
        CardSchedule {
            interval_days,
            ease_factor,
            repetitions,
            ..CardSchedule::new(Utc::now())
        }
    }

    #[test]
    fn test_new_card_first_good_answer() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();

        let next = scheduler.process_answer(&CardSchedule::new(now), QualityRating::Good, now);

        assert_eq!(next.interval_days, 1, "First correct recall stays at 1 day");
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.ease_factor, DEFAULT_EASE_FACTOR);
        assert_eq!(next.next_review, now + Duration::days(1));
        assert_eq!(next.last_reviewed, Some(now));
    }

    #[test]
    fn test_second_good_answer_jumps_to_six_days() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let first = scheduler.process_answer(&CardSchedule::new(now), QualityRating::Good, now);

        let second = scheduler.process_answer(&first, QualityRating::Good, now);

        assert_eq!(second.interval_days, 6, "Second correct recall jumps to 6 days");
        assert_eq!(second.repetitions, 2);
    }

    #[test]
    fn test_mature_card_multiplies_by_ease_factor() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let schedule = schedule_with(6, 2.5, 2);

        let next = scheduler.process_answer(&schedule, QualityRating::Good, now);

        assert_eq!(next.interval_days, 15, "round(6 * 2.5) = 15");
        assert_eq!(next.repetitions, 3);
    }

    #[test]
    fn test_lapse_resets_interval_and_repetitions() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let schedule = schedule_with(30, 2.2, 5);

        let next = scheduler.process_answer(&schedule, QualityRating::Again, now);

        assert_eq!(next.interval_days, 1, "Lapse resets to 1 day");
        assert_eq!(next.repetitions, 0, "Lapse clears the streak");
    }

    #[test]
    fn test_hard_resets_streak_without_requeue_semantics() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let schedule = schedule_with(10, 2.5, 3);

        let next = scheduler.process_answer(&schedule, QualityRating::Hard, now);

        assert_eq!(next.interval_days, 1, "Hard is below the correctness threshold");
        assert_eq!(next.repetitions, 0);
    }

    #[test]
    fn test_ease_factor_deltas_per_rating() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let schedule = schedule_with(10, 2.5, 3);

        let easy = scheduler.process_answer(&schedule, QualityRating::Easy, now);
        let good = scheduler.process_answer(&schedule, QualityRating::Good, now);
        let hard = scheduler.process_answer(&schedule, QualityRating::Hard, now);
        let again = scheduler.process_answer(&schedule, QualityRating::Again, now);

        assert!((easy.ease_factor - 2.6).abs() < 1e-6, "Easy adds 0.10, got {}", easy.ease_factor);
        assert!((good.ease_factor - 2.5).abs() < 1e-6, "Good holds, got {}", good.ease_factor);
        assert!((hard.ease_factor - 2.36).abs() < 1e-6, "Hard costs 0.14, got {}", hard.ease_factor);
        assert!((again.ease_factor - 2.18).abs() < 1e-6, "Again costs 0.32, got {}", again.ease_factor);
    }

    #[test]
    fn test_ease_factor_never_below_floor() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let mut schedule = schedule_with(1, MIN_EASE_FACTOR, 0);

        for _ in 0..10 {
            schedule = scheduler.process_answer(&schedule, QualityRating::Again, now);
            assert_eq!(schedule.ease_factor, MIN_EASE_FACTOR);
        }
    }

    #[test]
    fn test_invariants_over_randomized_schedules() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let schedule = schedule_with(
                rng.gen_range(1..=365),
                rng.gen_range(MIN_EASE_FACTOR..=3.5),
                rng.gen_range(0..=20),
            );
            for rating in QualityRating::ALL {
                let next = scheduler.process_answer(&schedule, rating, now);

                assert!(
                    next.ease_factor >= MIN_EASE_FACTOR,
                    "Ease factor dropped below floor: {}",
                    next.ease_factor
                );
                assert!(next.interval_days >= 1, "Interval must stay positive");
                if rating.is_correct() {
                    assert_eq!(next.repetitions, schedule.repetitions + 1);
                } else {
                    assert_eq!(next.repetitions, 0);
                    assert_eq!(next.interval_days, 1);
                }
            }
        }
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let scheduler = Sm2Scheduler::new();
        let now = Utc::now();
        let schedule = schedule_with(17, 2.31, 4);

        let a = scheduler.process_answer(&schedule, QualityRating::Good, now);
        let b = scheduler.process_answer(&schedule, QualityRating::Good, now);

        assert_eq!(a, b, "Identical inputs must produce identical schedules");
    }

    #[test]
    fn test_preview_intervals_mature_card() {
        let scheduler = Sm2Scheduler::new();
        let schedule = schedule_with(10, 2.0, 3);

        let previews = scheduler.preview_intervals(&schedule);

        assert_eq!(previews[0], (QualityRating::Again, 1));
        assert_eq!(previews[1], (QualityRating::Hard, 1));
        assert_eq!(previews[2], (QualityRating::Good, 20));
        assert_eq!(previews[3], (QualityRating::Easy, 20));
    }
}
