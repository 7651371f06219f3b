//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types and make the
//! code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform user identifier.
///
/// Used for followers, message senders, fragment authors, and delivery
/// recipients alike; the platform assigns these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        UserId(n)
    }
}
