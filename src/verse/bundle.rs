//! The precomputed lookup-table bundle.
//!
//! The bundle is produced offline by the corpus pipeline and loaded once per
//! run from the path given on the command line. It is read-only: compose
//! workers share a single instance behind an `Arc`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::types::Fragment;

/// Errors from bundle loading.
#[derive(Debug, Error)]
pub enum BundleError {
    /// IO error reading the bundle file.
    #[error("IO error reading bundle: {0}")]
    Io(#[from] io::Error),

    /// The bundle file did not decode.
    #[error("bundle decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lookup tables for composition building.
///
/// Masks are opaque structural keys assigned by the corpus pipeline. Each
/// mask owns candidate fragments; `matched_masks` records which masks the
/// pipeline found structurally compatible (rhyme-wise) with a given mask.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupBundle {
    /// Candidate fragments per mask.
    pub mask_to_fragments: HashMap<String, Vec<Fragment>>,

    /// Structurally compatible masks per mask.
    pub matched_masks: HashMap<String, Vec<String>>,

    /// The vocabulary the corpus pipeline knows.
    #[serde(default)]
    pub vocabulary: HashSet<String>,
}

/// Loads the bundle from a JSON file.
pub fn load_bundle(path: &Path) -> Result<LookupBundle, BundleError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
