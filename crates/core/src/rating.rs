//! Closing ratings and the per-worker running aggregate.

use serde::Serialize;

use crate::error::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Maximum length of the review text left with a closing rating.
pub const MAX_REVIEW_LEN: usize = 2000;

/// A closing score in `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(i16);

impl Rating {
    pub fn new(value: i16) -> Result<Self, CoreError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidRating(value))
        }
    }

    pub fn value(self) -> i16 {
        self.0
    }
}

/// Validate the free-text review left with a rating. Empty is allowed.
pub fn validate_review(review: &str) -> Result<(), CoreError> {
    if review.chars().count() > MAX_REVIEW_LEN {
        return Err(CoreError::Validation(format!(
            "Review must not exceed {MAX_REVIEW_LEN} characters"
        )));
    }
    Ok(())
}

/// Running `(average, count)` summary of every rated job a worker closed.
///
/// The average is 0 while the count is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingAggregate {
    pub average: f64,
    pub count: i32,
}

impl RatingAggregate {
    pub const EMPTY: RatingAggregate = RatingAggregate {
        average: 0.0,
        count: 0,
    };

    /// Fold one more closing rating into the aggregate.
    ///
    /// `new_average = (average * count + r) / (count + 1)`.
    pub fn record(self, rating: Rating) -> RatingAggregate {
        let new_count = self.count + 1;
        let total = self.average * f64::from(self.count) + f64::from(rating.value());
        RatingAggregate {
            average: total / f64::from(new_count),
            count: new_count,
        }
    }
}

impl Default for RatingAggregate {
    fn default() -> Self {
        Self::EMPTY
    }
}
