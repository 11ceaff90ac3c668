//! Database entities.

pub mod dish;
pub mod event;
pub mod user;
pub mod vote;

pub use dish::Entity as Dish;
pub use event::Entity as Event;
pub use user::Entity as User;
pub use vote::Entity as Vote;
