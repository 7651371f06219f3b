//! Candidate composition for one inbound message.
//!
//! `compose` is pure given its inputs: it reads an immutable snapshot
//! (lookup bundle, follower registry, delivered-set snapshot) and one
//! message, and produces either ranked candidates or a rejection. It never
//! touches the network or the live cache, so it is safe to run on a worker
//! pool with no shared mutable state.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::info;

use crate::types::{CompositionCandidate, Followers, InboundMessage, Style, UserId};
use crate::verse::{Lexicon, LookupBundle, VerseEngine};

/// Reply for senders outside the follower registry.
pub const NOT_FOLLOWER_REPLY: &str = "Join the community first.";

/// Reply when no usable words survive normalization and vocabulary filtering.
pub const UNKNOWN_WORDS_REPLY: &str = "I don't know any of those words.";

/// Reply when no composition can be built (or none survives dedup).
pub const NO_BLOCKS_REPLY: &str = "Too little gets written about that.";

/// The filtered word count must be strictly between these bounds.
const MIN_WORDS_EXCLUSIVE: usize = 0;
const MAX_WORDS_EXCLUSIVE: usize = 5;

/// Why a message was rejected instead of composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The sender is not in the follower registry.
    NotFollower,

    /// Normalization and vocabulary filtering left 0 or too many words.
    NoUsableWords,

    /// The engine produced no candidates.
    NoCandidates,
}

impl RejectReason {
    /// The fixed reply sent to the sender for this rejection.
    pub fn reply_text(&self) -> &'static str {
        match self {
            RejectReason::NotFollower => NOT_FOLLOWER_REPLY,
            RejectReason::NoUsableWords => UNKNOWN_WORDS_REPLY,
            RejectReason::NoCandidates => NO_BLOCKS_REPLY,
        }
    }
}

/// The outcome of composing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// Ranked candidates are ready for selection and dispatch.
    Accepted {
        sender: UserId,
        /// Candidates in engine rank order. Order is significant.
        candidates: Vec<CompositionCandidate>,
        /// Space-joined filtered words, used as the image title.
        title: String,
    },

    /// The message cannot be answered with a composition.
    Rejected {
        sender: UserId,
        reason: RejectReason,
    },
}

/// Immutable inputs shared by every compose task in a run.
#[derive(Debug, Clone)]
pub struct ComposeSnapshot {
    /// The read-only lookup-table bundle.
    pub bundle: Arc<LookupBundle>,

    /// The follower registry, frozen at the start of the run.
    pub followers: Arc<Followers>,

    /// Delivered sets per user as of the start of the compose phase.
    pub delivered: Arc<HashMap<UserId, BTreeSet<String>>>,

    /// Style override from configuration, if any.
    pub style_override: Option<String>,
}

/// Composes candidates for one inbound message.
pub fn compose<L, G>(
    snapshot: &ComposeSnapshot,
    lexicon: &L,
    engine: &G,
    message: &InboundMessage,
) -> ComposeOutcome
where
    L: Lexicon,
    G: VerseEngine,
{
    let sender = message.sender;
    let style = Style::resolve(snapshot.style_override.as_deref());
    info!(%style, scheme = style.scheme(), "composing with style");

    if !snapshot.followers.contains(sender) {
        return ComposeOutcome::Rejected {
            sender,
            reason: RejectReason::NotFollower,
        };
    }

    let words = lexicon.normalize(&message.body);
    info!(%sender, words = %words.join(" "), "normalized message");

    // Filter to vocabulary, deduplicated, first-seen order preserved.
    let mut seen = BTreeSet::new();
    let good_words: Vec<String> = words
        .into_iter()
        .filter(|w| lexicon.in_vocab(w) && seen.insert(w.clone()))
        .collect();

    if good_words.len() <= MIN_WORDS_EXCLUSIVE || good_words.len() >= MAX_WORDS_EXCLUSIVE {
        return ComposeOutcome::Rejected {
            sender,
            reason: RejectReason::NoUsableWords,
        };
    }

    let title = good_words.join(" ");
    info!(%sender, %title, "usable words");

    let excluded = snapshot.delivered.get(&sender).cloned().unwrap_or_default();
    let candidates = engine.build(&snapshot.bundle, style, &excluded, &good_words);
    if candidates.is_empty() {
        return ComposeOutcome::Rejected {
            sender,
            reason: RejectReason::NoCandidates,
        };
    }

    ComposeOutcome::Accepted {
        sender,
        candidates,
        title,
    }
}
