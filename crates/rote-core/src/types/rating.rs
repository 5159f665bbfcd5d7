//! Quality rating for card answers.

use serde::{Deserialize, Serialize};

/// Quality rating for a card answer (maps to rating values 1-4).
///
/// Recorded when the learner grades their own recall:
/// - Again (1): Complete failure to recall
/// - Hard (2): Successful but difficult recall
/// - Good (3): Normal successful recall
/// - Easy (4): Effortless recall
///
/// Ratings are totally ordered: `Again < Hard < Good < Easy`. `Good` is the
/// correctness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum QualityRating {
    /// Complete failure to recall.
    Again = 1,
    /// Successful but difficult recall.
    Hard = 2,
    /// Normal successful recall.
    Good = 3,
    /// Effortless recall.
    Easy = 4,
}

impl QualityRating {
    /// All ratings in ascending order.
    pub const ALL: [QualityRating; 4] = [
        QualityRating::Again,
        QualityRating::Hard,
        QualityRating::Good,
        QualityRating::Easy,
    ];

    /// Convert to the numeric rating value (u8).
    pub fn to_rating(self) -> u8 {
        self as u8
    }

    /// Create from a numeric rating value.
    ///
    /// Returns None for values outside 1-4.
    pub fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            1 => Some(QualityRating::Again),
            2 => Some(QualityRating::Hard),
            3 => Some(QualityRating::Good),
            4 => Some(QualityRating::Easy),
            _ => None,
        }
    }

    /// Whether this rating counts as a correct recall.
    ///
    /// `Good` and `Easy` are correct; `Again` and `Hard` reset the
    /// repetition streak.
    pub fn is_correct(self) -> bool {
        self >= QualityRating::Good
    }
}

impl From<QualityRating> for u8 {
    fn from(rating: QualityRating) -> Self {
        rating.to_rating()
    }
}

impl TryFrom<u8> for QualityRating {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        QualityRating::from_rating(value).ok_or(())
    }
}
