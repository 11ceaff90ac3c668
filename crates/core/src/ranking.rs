//! Rating aggregation and dish ranking.
//!
//! Turns the dishes of one event and the votes cast on them into per-dish
//! statistics ordered by average rating, plus the event's highlights:
//!
//! - **winner**: highest average (first in the ranking)
//! - **loser**: lowest average, only when there is more than one dish
//! - **most divisive**: widest spread between highest and lowest rating,
//!   most votes breaking ties, only when there is more than one dish and
//!   that spread is nonzero
//!
//! Everything here is pure and infallible. Ratings are aggregated as given,
//! whatever their range.

use std::collections::HashMap;

use dinner_db::entities::{dish, vote};
use serde::Serialize;

/// Aggregated ratings of a single dish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishStatistic {
    pub dish_id: String,
    pub name: String,
    /// Mean rating, unrounded. 0 when the dish has no votes.
    pub average_rating: f64,
    pub vote_count: usize,
    pub min_rating: i32,
    pub max_rating: i32,
    /// `max_rating - min_rating`.
    pub rating_range: i32,
}

impl DishStatistic {
    fn from_ratings(dish: &dish::Model, ratings: &[i32]) -> Self {
        let (Some(&min), Some(&max)) = (ratings.iter().min(), ratings.iter().max()) else {
            return Self {
                dish_id: dish.id.clone(),
                name: dish.name.clone(),
                average_rating: 0.0,
                vote_count: 0,
                min_rating: 0,
                max_rating: 0,
                rating_range: 0,
            };
        };

        // i64 so that extreme ratings cannot overflow the sum
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();

        Self {
            dish_id: dish.id.clone(),
            name: dish.name.clone(),
            average_rating: sum as f64 / ratings.len() as f64,
            vote_count: ratings.len(),
            min_rating: min,
            max_rating: max,
            rating_range: max.saturating_sub(min),
        }
    }
}

/// Notable dishes of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    pub winner: Option<DishStatistic>,
    pub loser: Option<DishStatistic>,
    pub most_divisive: Option<DishStatistic>,
}

impl Highlights {
    /// Pick the highlights from statistics already sorted by descending average.
    #[must_use]
    pub fn from_statistics(statistics: &[DishStatistic]) -> Self {
        let winner = statistics.first().cloned();

        if statistics.len() < 2 {
            return Self {
                winner,
                ..Self::default()
            };
        }

        // `min_by` keeps the first of several equal elements
        let loser = statistics
            .iter()
            .min_by(|a, b| a.average_rating.total_cmp(&b.average_rating))
            .cloned();

        let most_divisive = statistics
            .iter()
            .min_by(|a, b| {
                b.rating_range
                    .cmp(&a.rating_range)
                    .then(b.vote_count.cmp(&a.vote_count))
            })
            .filter(|s| s.rating_range > 0)
            .cloned();

        Self {
            winner,
            loser,
            most_divisive,
        }
    }
}

/// Ranked statistics of an event together with its highlights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub statistics: Vec<DishStatistic>,
    pub highlights: Highlights,
}

impl Ranking {
    /// Aggregate and rank the dishes of one event.
    #[must_use]
    pub fn compute(dishes: &[dish::Model], votes: &[vote::Model]) -> Self {
        let statistics = compute_statistics(dishes, votes);
        let highlights = Highlights::from_statistics(&statistics);
        Self {
            statistics,
            highlights,
        }
    }
}

/// Compute per-dish statistics sorted by descending average rating.
///
/// The sort is stable: dishes with equal averages keep their input order.
/// Votes for dishes not in `dishes` are ignored.
#[must_use]
pub fn compute_statistics(dishes: &[dish::Model], votes: &[vote::Model]) -> Vec<DishStatistic> {
    let mut ratings_by_dish: HashMap<&str, Vec<i32>> = HashMap::new();
    for vote in votes {
        ratings_by_dish
            .entry(vote.dish_id.as_str())
            .or_default()
            .push(vote.rating);
    }

    let mut statistics: Vec<DishStatistic> = dishes
        .iter()
        .map(|dish| {
            let ratings = ratings_by_dish
                .get(dish.id.as_str())
                .map_or(&[][..], Vec::as_slice);
            DishStatistic::from_ratings(dish, ratings)
        })
        .collect();

    statistics.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    statistics
}
