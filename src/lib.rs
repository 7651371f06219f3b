//! versebot - answers unread direct messages with short rhymed compositions
//! rendered as images.
//!
//! This library provides the orchestration core: a parallel compose phase
//! over immutable snapshots, a serialized dispatch phase performing all
//! remote calls, and a durable per-user uniqueness cache that prevents
//! re-delivering fragments a user has already seen.

pub mod cache;
pub mod composer;
pub mod config;
pub mod platform;
pub mod render;
pub mod run;
pub mod selector;
pub mod types;
pub mod verse;

#[cfg(test)]
pub(crate) mod test_utils;
