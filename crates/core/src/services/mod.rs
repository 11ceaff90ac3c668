//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod event;
pub mod identity;
pub mod vote;

pub use account::{AccountService, PROVIDER_CREDENTIALS, RegisterInput};
pub use event::{CreateEventInput, DishDetail, EventDetail, EventService, VoteSummary};
pub use identity::{
    FederatedCredentials, FederatedProfile, FederatedProvider, IdentityProvider, IdentityVerifier,
    PasswordCredentials, PasswordProvider, UserInfoVerifier,
};
pub use vote::{SubmitVotesInput, VoteInput, VoteService};
