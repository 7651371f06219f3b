//! The remote messaging platform boundary: trait, HTTP client, pagination.

pub mod api;
pub mod error;
pub mod http;
pub mod paging;

pub use api::{DIALOG_PAGE_SIZE, FOLLOWER_PAGE_SIZE, Page, PhotoRef, Platform};
pub use error::{PlatformError, Result};
pub use http::HttpPlatform;
pub use paging::collect_all;
