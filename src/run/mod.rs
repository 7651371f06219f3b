//! The top-level dispatch loop.
//!
//! One run: refresh the follower registry, collect pending inbound messages,
//! apply admin reset commands, compose candidates in parallel across the
//! worker pool, then sequentially select, render, upload, send, and persist
//! for each result.
//!
//! All remote calls and every cache mutation happen here, on the controlling
//! task, after the parallel phase completes; workers only ever see immutable
//! snapshots. A transport failure for one recipient is logged with recipient
//! context and skipped, never aborting sibling recipients or later messages.
//! The cache is persisted after the reset batch and after each message's
//! fan-out, bounding a crash's blast radius to one unpersisted message.

pub mod pool;


use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::cache::{StoreError, UsedCache, load_cache, save_cache};
use crate::composer::{ComposeOutcome, ComposeSnapshot, NO_BLOCKS_REPLY, compose};
use crate::config::Config;
use crate::platform::{
    DIALOG_PAGE_SIZE, FOLLOWER_PAGE_SIZE, Platform, PlatformError, collect_all,
};
use crate::render::Renderer;
use crate::selector::select_block;
use crate::types::{Followers, InboundMessage, UserId};
use crate::verse::{Lexicon, LookupBundle, VerseEngine};

/// Message body substring that marks an admin reset command.
const RESET_KEYWORD: &str = "clear";

/// Acknowledgement reply for a processed reset command.
const RESET_ACK: &str = "done";

/// Errors that abort a run.
///
/// Per-recipient transport failures are handled inline and never surface
/// here; these are the failures with no sensible continuation (listing the
/// followers failed, the cache store is unreadable or unwritable).
#[derive(Debug, Error)]
pub enum RunError {
    /// A platform listing call failed.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// The cache store could not be loaded or saved.
    #[error("cache store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for run operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// The dispatch orchestrator: owns the platform client, the generation
/// collaborators, and the run configuration.
pub struct Orchestrator<P, L, G, R> {
    platform: P,
    lexicon: Arc<L>,
    engine: Arc<G>,
    renderer: R,
    bundle: Arc<LookupBundle>,
    config: Config,
}

impl<P, L, G, R> Orchestrator<P, L, G, R>
where
    P: Platform + Sync,
    L: Lexicon + Send + Sync + 'static,
    G: VerseEngine + Send + Sync + 'static,
    R: Renderer,
{
    pub fn new(
        platform: P,
        lexicon: L,
        engine: G,
        renderer: R,
        bundle: Arc<LookupBundle>,
        config: Config,
    ) -> Self {
        Orchestrator {
            platform,
            lexicon: Arc::new(lexicon),
            engine: Arc::new(engine),
            renderer,
            bundle,
            config,
        }
    }

    /// Performs one complete run.
    pub async fn run(&self) -> Result<()> {
        let followers: Followers = collect_all(FOLLOWER_PAGE_SIZE, self.config.sleep, |o, l| {
            self.platform.follower_page(o, l)
        })
        .await?
        .into_iter()
        .collect();
        info!(count = followers.len(), "follower registry refreshed");

        let inbound = collect_all(DIALOG_PAGE_SIZE, self.config.sleep, |o, l| {
            self.platform.dialog_page(o, l)
        })
        .await?;
        if inbound.is_empty() {
            info!("no unanswered dialogs");
            return Ok(());
        }
        info!(count = inbound.len(), "unanswered dialogs collected");

        let mut cache = load_cache(&self.config.cache_path)?;
        info!(entries = cache.len(), "uniqueness cache loaded");

        let pending = self.apply_resets(&mut cache, &followers, inbound).await?;

        let followers = Arc::new(followers);
        let outcomes = self.compose_all(&cache, Arc::clone(&followers), pending).await;

        for outcome in outcomes {
            // A panicked compose task was already logged at the pool boundary.
            let Some(outcome) = outcome else { continue };
            self.dispatch(&mut cache, &followers, outcome).await?;
        }

        Ok(())
    }

    /// Partitions out admin reset commands, applies them, and persists the
    /// cache once if any reset occurred. Returns the messages left for
    /// normal processing.
    async fn apply_resets(
        &self,
        cache: &mut UsedCache,
        followers: &Followers,
        inbound: Vec<InboundMessage>,
    ) -> Result<Vec<InboundMessage>> {
        let now = Utc::now();
        let mut pending = Vec::with_capacity(inbound.len());
        let mut cache_modified = false;

        for message in inbound {
            let is_command = self.config.tester_ids.contains(&message.sender)
                && message.body.contains(RESET_KEYWORD);
            if !is_command {
                pending.push(message);
                continue;
            }

            cache.reset(message.sender, now);
            cache_modified = true;
            info!(user = %followers.name_or_id(message.sender), "cache reset");
            if let Err(e) = self.platform.send_text(message.sender, RESET_ACK).await {
                error!(user = %followers.name_or_id(message.sender), "reset ack failed: {e}");
            }
        }

        if cache_modified {
            save_cache(&self.config.cache_path, cache)?;
        }
        Ok(pending)
    }

    /// Runs the composer over every pending message on the worker pool.
    ///
    /// Workers receive an immutable snapshot and return a pure result; slots
    /// for panicked tasks are `None`.
    async fn compose_all(
        &self,
        cache: &UsedCache,
        followers: Arc<Followers>,
        pending: Vec<InboundMessage>,
    ) -> Vec<Option<ComposeOutcome>> {
        let snapshot = ComposeSnapshot {
            bundle: Arc::clone(&self.bundle),
            followers,
            delivered: Arc::new(cache.delivered_snapshot()),
            style_override: self.config.style.clone(),
        };
        let lexicon = Arc::clone(&self.lexicon);
        let engine = Arc::clone(&self.engine);

        pool::map_ordered(self.config.processes, pending, move |message| {
            compose(&snapshot, lexicon.as_ref(), engine.as_ref(), &message)
        })
        .await
    }

    /// Handles one compose result: replies to rejections, or selects a block
    /// and fans it out. Persists the cache after a fan-out completes.
    async fn dispatch(
        &self,
        cache: &mut UsedCache,
        followers: &Followers,
        outcome: ComposeOutcome,
    ) -> Result<()> {
        let (sender, candidates, title) = match outcome {
            ComposeOutcome::Rejected { sender, reason } => {
                self.send_reply(followers, sender, reason.reply_text()).await;
                self.pace().await;
                return Ok(());
            }
            ComposeOutcome::Accepted {
                sender,
                candidates,
                title,
            } => (sender, candidates, title),
        };

        let now = Utc::now();
        let Some(selection) =
            select_block(cache, followers, &self.config, now, sender, &candidates)
        else {
            self.send_reply(followers, sender, NO_BLOCKS_REPLY).await;
            self.pace().await;
            return Ok(());
        };

        for &recipient in &selection.recipients {
            let attribution = self.attribution(followers, sender, recipient);
            let image = match self
                .renderer
                .render(&selection.post, attribution.as_deref(), &title)
            {
                Ok(image) => image,
                Err(e) => {
                    // Rendering is deterministic; retrying other recipients
                    // would fail the same way. Abort this message's fan-out.
                    error!(user = %followers.name_or_id(recipient), "render failed: {e}");
                    break;
                }
            };

            let delivered_at = Utc::now();
            cache.touch(recipient, delivered_at);
            match self.deliver(recipient, image).await {
                Ok(()) => {
                    cache.record_delivery(
                        recipient,
                        delivered_at,
                        selection.post.iter().cloned(),
                    );
                    info!(user = %followers.name_or_id(recipient), "delivered");
                }
                Err(e) => {
                    error!(user = %followers.name_or_id(recipient), "send failed: {e}");
                }
            }
            self.pace().await;
        }

        save_cache(&self.config.cache_path, cache)?;
        Ok(())
    }

    /// Uploads the image and sends it as an attachment.
    async fn deliver(&self, recipient: UserId, image: Vec<u8>) -> crate::platform::Result<()> {
        let photo = self.platform.upload_image(image).await?;
        self.platform.send_attachment(recipient, &photo).await
    }

    /// Attribution shown on the rendered image.
    ///
    /// Testers see the requester's name (none at all when a tester is
    /// replying to themselves); everyone else is attributed with their own
    /// display name.
    fn attribution(
        &self,
        followers: &Followers,
        sender: UserId,
        recipient: UserId,
    ) -> Option<String> {
        let is_tester = self.config.tester_ids.contains(&recipient);
        if is_tester && recipient == sender {
            None
        } else if is_tester {
            followers.name(sender).map(str::to_string)
        } else {
            followers.name(recipient).map(str::to_string)
        }
    }

    /// Sends a fixed text reply, logging instead of propagating a failure.
    async fn send_reply(&self, followers: &Followers, user: UserId, text: &str) {
        if let Err(e) = self.platform.send_text(user, text).await {
            error!(user = %followers.name_or_id(user), "reply failed: {e}");
        }
    }

    /// The fixed, unconditional pacing delay between remote calls.
    async fn pace(&self) {
        tokio::time::sleep(self.config.sleep).await;
    }

    /// The platform client (used by tests to inspect recorded calls).
    #[cfg(test)]
    pub(crate) fn platform(&self) -> &P {
        &self.platform
    }
}
