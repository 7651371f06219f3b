//! Core domain types.

pub mod ids;
pub mod message;
pub mod style;

pub use ids::UserId;
pub use message::{CompositionCandidate, Follower, Followers, Fragment, InboundMessage};
pub use style::Style;
