//! Rating aggregation.
//!
//! A destination carries a running mean and a count. Each accepted rating is folded in
//! with `new_avg = (avg * count + rating) / (count + 1)`, executed by the store as one
//! atomic read-modify-write per record so concurrent raters never lose an update.

use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    models::Destination,
    repository::DestinationState,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

/// A rating known to lie in `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i32) -> Result<Self> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(AppError::InvalidRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// The two rating fields of a destination, always read and written together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

impl RatingSummary {
    pub fn of(destination: &Destination) -> Self {
        Self {
            average: destination.average_rating,
            count: destination.rating_count,
        }
    }

    /// Folds one more rating into the running mean.
    pub fn record(self, rating: Rating) -> Self {
        let count = self.count + 1;
        let total = self.average * f64::from(self.count) + f64::from(rating.value());
        Self {
            average: total / f64::from(count),
            count,
        }
    }
}

/// RatingAggregator
///
/// Validates a rating and hands the fold to the destination store's per-record
/// read-modify-write. An invalid rating is rejected before the store is touched.
pub struct RatingAggregator {
    destinations: DestinationState,
}

/// RatingState
pub type RatingState = Arc<RatingAggregator>;

impl RatingAggregator {
    pub fn new(destinations: DestinationState) -> Self {
        Self { destinations }
    }

    pub async fn evaluate(&self, id: i64, rating: i32) -> Result<Destination> {
        let rating = Rating::new(rating).inspect_err(|_| {
            tracing::warn!(destination_id = id, rating, "rating rejected: out of range");
        })?;

        let updated = self
            .destinations
            .modify_rating(id, &move |summary: RatingSummary| summary.record(rating))
            .await
            .ok_or_else(|| AppError::NotFound(format!("destination {id}")))?;

        tracing::info!(
            destination_id = id,
            rating = rating.value(),
            average = updated.average_rating,
            count = updated.rating_count,
            "rating recorded"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(10).is_ok());
        assert_eq!(Rating::new(0), Err(AppError::InvalidRating(0)));
        assert_eq!(Rating::new(11), Err(AppError::InvalidRating(11)));
        assert_eq!(Rating::new(-3), Err(AppError::InvalidRating(-3)));
    }

    #[test]
    fn test_record_folds_running_mean() {
        let empty = RatingSummary { average: 0.0, count: 0 };
        let once = empty.record(Rating::new(8).unwrap());
        assert_eq!(once, RatingSummary { average: 8.0, count: 1 });

        let twice = once.record(Rating::new(4).unwrap());
        assert_eq!(twice, RatingSummary { average: 6.0, count: 2 });
    }
}
