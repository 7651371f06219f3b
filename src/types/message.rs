//! Core data model: followers, inbound messages, and composition candidates.
//!
//! The follower registry is built once per run from a full platform listing
//! and is read-only afterward. Inbound messages are ephemeral. Composition
//! candidates come from the generation engine already ranked; rank order is
//! significant and is preserved everywhere they flow.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// A community follower as returned by the platform listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    /// The follower's platform id.
    pub id: UserId,

    /// Display name ("first last") captured from the listing. Used for image
    /// attribution and log context.
    pub display_name: String,
}

/// An unanswered direct message pulled from the dialog listing.
///
/// Ephemeral: never persisted, answered (or rejected) within the run that
/// fetched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Who sent the message.
    pub sender: UserId,

    /// The raw message text.
    pub body: String,
}

/// A single attributable unit of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// The fragment text, exactly as it will be delivered.
    pub text: String,

    /// The user whose material this fragment reuses.
    pub author: UserId,
}

/// One ranked composition produced by the generation engine: an ordered list
/// of fragments with originating-author attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionCandidate {
    /// Fragments in delivery order.
    pub fragments: Vec<Fragment>,
}

impl CompositionCandidate {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        CompositionCandidate { fragments }
    }

    /// The flattened fragment texts in delivery order (the "post").
    pub fn post(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.text.clone()).collect()
    }

    /// The fragment texts as a set, for overlap checks against delivered sets.
    pub fn text_set(&self) -> BTreeSet<String> {
        self.fragments.iter().map(|f| f.text.clone()).collect()
    }
}

/// The follower registry: id to display name, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Followers {
    names: HashMap<UserId, String>,
}

impl Followers {
    /// Builds the registry from a complete platform listing.
    pub fn from_listing(listing: Vec<Follower>) -> Self {
        Followers {
            names: listing
                .into_iter()
                .map(|f| (f.id, f.display_name))
                .collect(),
        }
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.names.contains_key(&id)
    }

    /// The display name for a follower, if they are one.
    pub fn name(&self, id: UserId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Display name for log context, falling back to the raw id for users
    /// outside the registry (e.g. testers who never joined).
    pub fn name_or_id(&self, id: UserId) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<Follower> for Followers {
    fn from_iter<I: IntoIterator<Item = Follower>>(iter: I) -> Self {
        Followers::from_listing(iter.into_iter().collect())
    }
}
