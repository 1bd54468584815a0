//! Worker eligibility filtering and ordering for a job location.
//!
//! The storage layer narrows the candidate set with cheap predicates; the
//! exact rules live here so they can be tested without a database.

use std::cmp::Ordering;

use serde::Serialize;

use crate::geo::{haversine_km, Coordinates};
use crate::rating::RatingAggregate;
use crate::types::DbId;

/// A worker profile as seen by the matching query.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub worker_id: DbId,
    pub base: Coordinates,
    pub coverage_radius_km: f64,
    pub is_available: bool,
    pub trades: Vec<DbId>,
    pub rating: RatingAggregate,
    pub hourly_rate: Option<f64>,
    pub years_experience: Option<i32>,
}

/// Window over the ordered eligible set. The default window is the whole set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchWindow {
    pub offset: usize,
    /// At most this many workers; `Some(0)` is treated as `Some(1)`.
    pub limit: Option<usize>,
}

impl MatchWindow {
    fn apply(self, matches: Vec<WorkerSummary>) -> Vec<WorkerSummary> {
        let take = self.limit.map_or(usize::MAX, |limit| limit.max(1));
        matches.into_iter().skip(self.offset).take(take).collect()
    }
}

/// One eligible worker, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerSummary {
    pub worker_id: DbId,
    pub distance_km: f64,
    pub coverage_radius_km: f64,
    pub rating_average: f64,
    pub rating_count: i32,
    pub hourly_rate: Option<f64>,
    pub years_experience: Option<i32>,
}

impl Candidate {
    /// Distance to `origin` if this worker is eligible for a job there in
    /// `category_id`, otherwise `None`.
    pub fn eligible_distance(&self, category_id: DbId, origin: Coordinates) -> Option<f64> {
        if !self.is_available || !self.trades.contains(&category_id) {
            return None;
        }
        let distance = haversine_km(origin, self.base);
        (distance <= self.coverage_radius_km).then_some(distance)
    }
}

/// Order two summaries: nearest first, then best rated, then lowest id.
fn rank(a: &WorkerSummary, b: &WorkerSummary) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| b.rating_average.total_cmp(&a.rating_average))
        .then_with(|| a.worker_id.cmp(&b.worker_id))
}

/// Filter `candidates` down to eligible workers for a job in `category_id`
/// at `origin`, ordered by [`rank`], then cut to `window`.
///
/// Excludes unavailable workers, workers without the trade, and workers
/// whose coverage radius does not reach the origin.
pub fn eligible_workers<I>(
    candidates: I,
    category_id: DbId,
    origin: Coordinates,
    window: MatchWindow,
) -> Vec<WorkerSummary>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut matches: Vec<WorkerSummary> = candidates
        .into_iter()
        .filter_map(|c| {
            let distance_km = c.eligible_distance(category_id, origin)?;
            Some(WorkerSummary {
                worker_id: c.worker_id,
                distance_km,
                coverage_radius_km: c.coverage_radius_km,
                rating_average: c.rating.average,
                rating_count: c.rating.count,
                hourly_rate: c.hourly_rate,
                years_experience: c.years_experience,
            })
        })
        .collect();

    matches.sort_by(rank);
    window.apply(matches)
}
