//! The generation boundary: text normalization, vocabulary membership, and
//! the composition engine.
//!
//! The linguistic work happens behind two traits so the orchestration core
//! never depends on a particular algorithm. [`engine`] provides the default
//! bundle-backed implementations; tests substitute mocks.

pub mod bundle;
pub mod engine;

use std::collections::BTreeSet;

use crate::types::{CompositionCandidate, Style};

pub use bundle::{BundleError, LookupBundle, load_bundle};
pub use engine::{BundleEngine, BundleLexicon};

/// Text normalization and vocabulary membership.
pub trait Lexicon {
    /// Splits raw message text into normalized word tokens, in order.
    fn normalize(&self, raw: &str) -> Vec<String>;

    /// Whether the corpus pipeline knows this word.
    fn in_vocab(&self, word: &str) -> bool;
}

/// The composition engine.
///
/// Returns candidates ranked best-first; rank order is significant and the
/// selector always proceeds in it. `excluded` is the requesting user's
/// already-delivered fragment set; engines must not build candidates from
/// excluded fragments. No further contract is assumed.
pub trait VerseEngine {
    fn build(
        &self,
        bundle: &LookupBundle,
        style: Style,
        excluded: &BTreeSet<String>,
        words: &[String],
    ) -> Vec<CompositionCandidate>;
}
