//! Composition styles (rhyme schemes).
//!
//! The active style is chosen per message: an explicit configuration override
//! is honored when it names a known style, and anything else (absent,
//! `"random"`, or unrecognized) falls back to a uniformly random choice among
//! the public styles. The `Probe` variant is internal diagnostic output and is
//! never picked by the fallback, only by an explicit override.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rhyme scheme for generated compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// Adjacent rhyme: aabb.
    Couplets,
    /// Alternating rhyme: abab.
    Alternating,
    /// Enclosed rhyme: abba.
    Enclosed,
    /// Single rhyme throughout: aaaa.
    Monorhyme,
    /// Internal: unrhymed single-line output for smoke-checking the pipeline.
    /// Reserved; excluded from the random fallback.
    Probe,
}

/// Styles eligible for the random fallback (everything but reserved variants).
const SELECTABLE: &[Style] = &[
    Style::Couplets,
    Style::Alternating,
    Style::Enclosed,
    Style::Monorhyme,
];

impl Style {
    /// Parses a style name, case-insensitively. Returns `None` for unknown
    /// names and for `"random"` (the caller falls back to [`Style::random`]).
    pub fn parse(name: &str) -> Option<Style> {
        match name.to_ascii_lowercase().as_str() {
            "couplets" => Some(Style::Couplets),
            "alternating" => Some(Style::Alternating),
            "enclosed" => Some(Style::Enclosed),
            "monorhyme" => Some(Style::Monorhyme),
            "probe" => Some(Style::Probe),
            _ => None,
        }
    }

    /// Picks a public style uniformly at random. Never returns a reserved
    /// variant.
    pub fn random() -> Style {
        SELECTABLE
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(Style::Couplets)
    }

    /// Resolves the active style from an optional override.
    pub fn resolve(override_name: Option<&str>) -> Style {
        override_name.and_then(Style::parse).unwrap_or_else(Style::random)
    }

    /// The rhyme pattern, one letter per line.
    pub fn scheme(&self) -> &'static str {
        match self {
            Style::Couplets => "aabb",
            Style::Alternating => "abab",
            Style::Enclosed => "abba",
            Style::Monorhyme => "aaaa",
            Style::Probe => "a",
        }
    }

    /// Number of lines a composition in this style carries.
    pub fn line_count(&self) -> usize {
        self.scheme().len()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Couplets => "couplets",
            Style::Alternating => "alternating",
            Style::Enclosed => "enclosed",
            Style::Monorhyme => "monorhyme",
            Style::Probe => "probe",
        };
        write!(f, "{}", name)
    }
}
