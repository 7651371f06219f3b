//! The remote platform boundary.
//!
//! `Platform` describes the handful of remote operations this core calls,
//! without committing to a wire protocol. The production implementation is
//! [`HttpPlatform`](super::http::HttpPlatform); tests use in-memory mocks
//! that record calls.
//!
//! # Example (mock for testing)
//!
//! ```ignore
//! struct MockPlatform {
//!     sent: Mutex<Vec<(UserId, String)>>,
//! }
//!
//! impl Platform for MockPlatform {
//!     async fn send_text(&self, user: UserId, text: &str) -> Result<()> {
//!         self.sent.lock().unwrap().push((user, text.to_string()));
//!         Ok(())
//!     }
//!     // ...
//! }
//! ```

use std::future::Future;

use crate::types::{Follower, InboundMessage, UserId};

use super::error::Result;

/// Page size for the follower listing.
pub const FOLLOWER_PAGE_SIZE: u64 = 1000;

/// Page size for the unanswered-dialog listing.
pub const DIALOG_PAGE_SIZE: u64 = 200;

/// One page of a paginated listing.
///
/// `total` is the server-reported total for the whole listing as of this
/// call. It may differ between calls; the collector treats the latest value
/// as authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page, in listing order.
    pub items: Vec<T>,

    /// Server-reported total item count for the whole listing.
    pub total: u64,
}

/// A registered uploaded image, ready to be attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoRef {
    /// Owner of the uploaded asset (the platform decides this on upload).
    pub owner_id: i64,

    /// The asset id.
    pub media_id: i64,
}

impl PhotoRef {
    /// The attachment string referencing this asset in a message send.
    pub fn attachment(&self) -> String {
        format!("photo{}_{}", self.owner_id, self.media_id)
    }
}

/// The remote messaging platform.
///
/// All methods may fail with a [`PlatformError`](super::error::PlatformError)
/// carrying a human-readable message; none are retried by this core.
pub trait Platform {
    /// Fetches one page of the community follower listing.
    fn follower_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Page<Follower>>> + Send;

    /// Fetches one page of the unanswered-dialog listing.
    fn dialog_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Page<InboundMessage>>> + Send;

    /// Sends a plain text message to a user.
    fn send_text(&self, user: UserId, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Uploads image bytes and registers them as a sendable asset.
    ///
    /// Wraps the platform's two-step flow: request an upload target, upload
    /// the binary content, register the uploaded asset.
    fn upload_image(&self, image: Vec<u8>) -> impl Future<Output = Result<PhotoRef>> + Send;

    /// Sends a message carrying an uploaded image as an attachment.
    fn send_attachment(
        &self,
        user: UserId,
        photo: &PhotoRef,
    ) -> impl Future<Output = Result<()>> + Send;
}
