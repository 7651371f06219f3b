//! Default bundle-backed implementations of the generation boundary.
//!
//! `BundleLexicon` normalizes text and answers vocabulary membership from the
//! bundle's word list. `BundleEngine` assembles candidates from the mask
//! tables: a mask whose fragments mention an input word seeds a candidate,
//! padded with fragments from its structurally compatible masks. Candidates
//! are ranked by how many input words they cover, then by mask key for
//! determinism.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::types::{CompositionCandidate, Fragment, Style};

use super::bundle::LookupBundle;
use super::{Lexicon, VerseEngine};

/// Lexicon backed by the bundle's vocabulary list.
#[derive(Debug, Clone)]
pub struct BundleLexicon {
    bundle: Arc<LookupBundle>,
}

impl BundleLexicon {
    pub fn new(bundle: Arc<LookupBundle>) -> Self {
        BundleLexicon { bundle }
    }
}

impl Lexicon for BundleLexicon {
    fn normalize(&self, raw: &str) -> Vec<String> {
        normalize_words(raw)
    }

    fn in_vocab(&self, word: &str) -> bool {
        self.bundle.vocabulary.contains(word)
    }
}

/// Lowercases and splits on anything non-alphanumeric.
pub fn normalize_words(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// The default composition engine.
#[derive(Debug, Clone, Default)]
pub struct BundleEngine;

impl BundleEngine {
    pub fn new() -> Self {
        BundleEngine
    }
}

impl VerseEngine for BundleEngine {
    fn build(
        &self,
        bundle: &LookupBundle,
        style: Style,
        excluded: &BTreeSet<String>,
        words: &[String],
    ) -> Vec<CompositionCandidate> {
        let lines = style.line_count();

        // Seed masks sorted by key so ties rank deterministically.
        let mut seeds: Vec<(&String, usize)> = bundle
            .mask_to_fragments
            .iter()
            .filter_map(|(mask, fragments)| {
                let coverage = words
                    .iter()
                    .filter(|w| fragments.iter().any(|f| mentions(&f.text, w)))
                    .count();
                (coverage > 0).then_some((mask, coverage))
            })
            .collect();
        seeds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        seeds
            .into_iter()
            .filter_map(|(mask, _)| assemble(bundle, mask, lines, excluded))
            .collect()
    }
}

/// Assembles one candidate from a seed mask and its matched masks.
///
/// Returns `None` when the available non-excluded fragments cannot fill the
/// style's line count.
fn assemble(
    bundle: &LookupBundle,
    seed: &str,
    lines: usize,
    excluded: &BTreeSet<String>,
) -> Option<CompositionCandidate> {
    let mut taken: Vec<Fragment> = Vec::with_capacity(lines);
    let mut seen = BTreeSet::new();

    let matched = bundle.matched_masks.get(seed);
    let masks = std::iter::once(seed).chain(matched.into_iter().flatten().map(String::as_str));

    for mask in masks {
        for fragment in bundle.mask_to_fragments.get(mask).into_iter().flatten() {
            if taken.len() == lines {
                break;
            }
            if excluded.contains(&fragment.text) || !seen.insert(fragment.text.clone()) {
                continue;
            }
            taken.push(fragment.clone());
        }
    }

    (taken.len() == lines).then(|| CompositionCandidate::new(taken))
}

/// Whole-word containment under the same normalization as message text.
fn mentions(text: &str, word: &str) -> bool {
    normalize_words(text).iter().any(|w| w == word)
}
