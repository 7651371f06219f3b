//! Shared test doubles: canned collaborators and an in-memory platform.

use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use crate::platform::{Page, PhotoRef, Platform, PlatformError, Result};
use crate::render::{RenderError, Renderer, SvgRenderer};
use crate::types::{CompositionCandidate, Follower, Followers, Fragment, InboundMessage, Style, UserId};
use crate::verse::engine::normalize_words;
use crate::verse::{Lexicon, LookupBundle, VerseEngine};

/// A follower registry with generated display names.
pub fn followers(ids: &[i64]) -> Followers {
    ids.iter().map(|&id| follower(id)).collect()
}

pub fn follower(id: i64) -> Follower {
    Follower {
        id: UserId(id),
        display_name: format!("User {id}"),
    }
}

/// A candidate from `(text, author)` pairs.
pub fn candidate(fragments: &[(&str, i64)]) -> CompositionCandidate {
    CompositionCandidate::new(
        fragments
            .iter()
            .map(|&(text, author)| Fragment {
                text: text.to_string(),
                author: UserId(author),
            })
            .collect(),
    )
}

pub fn message(sender: i64, body: &str) -> InboundMessage {
    InboundMessage {
        sender: UserId(sender),
        body: body.to_string(),
    }
}

/// Lexicon over a fixed word list.
pub struct WordListLexicon {
    vocab: HashSet<String>,
}

impl WordListLexicon {
    pub fn new(words: &[&str]) -> Self {
        WordListLexicon {
            vocab: words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Lexicon for WordListLexicon {
    fn normalize(&self, raw: &str) -> Vec<String> {
        normalize_words(raw)
    }

    fn in_vocab(&self, word: &str) -> bool {
        self.vocab.contains(word)
    }
}

/// Engine returning a canned candidate list, recording the excluded set it
/// was last called with.
pub struct FixedEngine {
    candidates: Vec<CompositionCandidate>,
    last_excluded: Mutex<BTreeSet<String>>,
}

impl FixedEngine {
    pub fn new(candidates: Vec<CompositionCandidate>) -> Self {
        FixedEngine {
            candidates,
            last_excluded: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn last_excluded(&self) -> BTreeSet<String> {
        self.last_excluded.lock().unwrap().clone()
    }
}

impl VerseEngine for FixedEngine {
    fn build(
        &self,
        _bundle: &LookupBundle,
        _style: Style,
        excluded: &BTreeSet<String>,
        _words: &[String],
    ) -> Vec<CompositionCandidate> {
        *self.last_excluded.lock().unwrap() = excluded.clone();
        self.candidates.clone()
    }
}

/// Renderer that fails for one configured title, delegating otherwise.
pub struct FlakyRenderer {
    fail_on_title: String,
    inner: SvgRenderer,
}

impl FlakyRenderer {
    pub fn new(fail_on_title: &str) -> Self {
        FlakyRenderer {
            fail_on_title: fail_on_title.to_string(),
            inner: SvgRenderer::default(),
        }
    }
}

impl Renderer for FlakyRenderer {
    fn render(
        &self,
        post: &[String],
        attribution: Option<&str>,
        title: &str,
    ) -> std::result::Result<Vec<u8>, RenderError> {
        if title == self.fail_on_title {
            return Err(RenderError("canvas allocation failed".to_string()));
        }
        self.inner.render(post, attribution, title)
    }
}

/// In-memory platform recording every call; configurable per-user failures.
pub struct MockPlatform {
    pub follower_listing: Vec<Follower>,
    pub dialog_listing: Vec<InboundMessage>,

    /// Text sends that succeeded, in order.
    pub sent_texts: Mutex<Vec<(UserId, String)>>,

    /// Attachment sends that succeeded, in order.
    pub sent_attachments: Mutex<Vec<UserId>>,

    /// Number of image uploads performed.
    pub uploads: Mutex<u64>,

    /// Users whose attachment sends fail with a platform error.
    pub fail_attachment_to: BTreeSet<UserId>,

    /// Users whose text sends fail with a platform error.
    pub fail_text_to: BTreeSet<UserId>,
}

impl MockPlatform {
    pub fn new(follower_listing: Vec<Follower>, dialog_listing: Vec<InboundMessage>) -> Self {
        MockPlatform {
            follower_listing,
            dialog_listing,
            sent_texts: Mutex::new(Vec::new()),
            sent_attachments: Mutex::new(Vec::new()),
            uploads: Mutex::new(0),
            fail_attachment_to: BTreeSet::new(),
            fail_text_to: BTreeSet::new(),
        }
    }

    pub fn texts(&self) -> Vec<(UserId, String)> {
        self.sent_texts.lock().unwrap().clone()
    }

    pub fn attachments(&self) -> Vec<UserId> {
        self.sent_attachments.lock().unwrap().clone()
    }
}

fn slice_page<T: Clone>(items: &[T], offset: u64, limit: u64) -> Page<T> {
    let start = (offset as usize).min(items.len());
    let end = (offset + limit).min(items.len() as u64) as usize;
    Page {
        items: items[start..end].to_vec(),
        total: items.len() as u64,
    }
}

impl Platform for MockPlatform {
    async fn follower_page(&self, offset: u64, limit: u64) -> Result<Page<Follower>> {
        Ok(slice_page(&self.follower_listing, offset, limit))
    }

    async fn dialog_page(&self, offset: u64, limit: u64) -> Result<Page<InboundMessage>> {
        Ok(slice_page(&self.dialog_listing, offset, limit))
    }

    async fn send_text(&self, user: UserId, text: &str) -> Result<()> {
        if self.fail_text_to.contains(&user) {
            return Err(PlatformError::api(902, "can't send messages to this user"));
        }
        self.sent_texts.lock().unwrap().push((user, text.to_string()));
        Ok(())
    }

    async fn upload_image(&self, _image: Vec<u8>) -> Result<PhotoRef> {
        let mut uploads = self.uploads.lock().unwrap();
        *uploads += 1;
        Ok(PhotoRef {
            owner_id: -1,
            media_id: *uploads as i64,
        })
    }

    async fn send_attachment(&self, user: UserId, _photo: &PhotoRef) -> Result<()> {
        if self.fail_attachment_to.contains(&user) {
            return Err(PlatformError::api(902, "can't send messages to this user"));
        }
        self.sent_attachments.lock().unwrap().push(user);
        Ok(())
    }
}
