//! Core business logic for dinner-rater.

pub mod ranking;
pub mod services;

pub use ranking::{DishStatistic, Highlights, Ranking, compute_statistics};
pub use services::*;
