//! Database repositories.

pub mod dish;
pub mod event;
pub mod user;
pub mod vote;

pub use dish::DishRepository;
pub use event::EventRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
