//! HTTP implementation of the platform boundary.
//!
//! The platform speaks a method-call JSON API: `GET {base}/{method}?params`
//! returns either `{"response": ...}` or `{"error": {"error_code",
//! "error_msg"}}`. Image sends are a two-step flow: request an upload target,
//! POST the binary content to it as multipart, register the uploaded asset,
//! then send a message referencing `photo{owner}_{id}`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::types::{Follower, InboundMessage, UserId};

use super::api::{Page, PhotoRef, Platform};
use super::error::{PlatformError, Result};

/// API version pinned for wire stability.
const API_VERSION: &str = "5.64";

/// A client for the platform's HTTP API, scoped to one community.
///
/// All listing operations target the community this client was configured
/// with; message sends go to individual users.
pub struct HttpPlatform {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    community_id: i64,
}

/// Response envelope for method calls.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiFault>,
}

/// Error payload inside the envelope.
#[derive(Debug, Deserialize)]
struct ApiFault {
    error_code: i64,
    error_msg: String,
}

/// A paginated listing as the platform returns it.
#[derive(Debug, Deserialize)]
struct Listing<T> {
    count: u64,
    items: Vec<T>,
}

/// One follower record from the member listing.
#[derive(Debug, Deserialize)]
struct WireMember {
    id: i64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

/// One dialog record: the platform nests the message.
#[derive(Debug, Deserialize)]
struct WireDialog {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    user_id: i64,
    #[serde(default)]
    body: String,
}

/// Upload target returned by the upload-server request.
#[derive(Debug, Deserialize)]
struct UploadTarget {
    upload_url: String,
}

/// Raw result of POSTing the image to the upload target.
#[derive(Debug, Deserialize)]
struct UploadReceipt {
    photo: String,
    server: i64,
    hash: String,
}

/// One registered photo from the save call.
#[derive(Debug, Deserialize)]
struct SavedPhoto {
    owner_id: i64,
    id: i64,
}

impl HttpPlatform {
    /// Creates a client from the run configuration.
    pub fn new(config: &Config) -> Self {
        HttpPlatform {
            client: reqwest::Client::new(),
            base_url: config.api_base.clone(),
            access_token: config.access_token.clone(),
            community_id: config.community_id,
        }
    }

    /// Calls one API method and unwraps the response envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let envelope: Envelope<T> = self
            .client
            .get(&url)
            .query(params)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("v", API_VERSION),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(fault) = envelope.error {
            return Err(PlatformError::Api {
                code: fault.error_code,
                message: fault.error_msg,
            });
        }
        envelope
            .response
            .ok_or_else(|| PlatformError::Malformed(format!("{method}: neither response nor error")))
    }
}

impl Platform for HttpPlatform {
    async fn follower_page(&self, offset: u64, limit: u64) -> Result<Page<Follower>> {
        let listing: Listing<WireMember> = self
            .call(
                "groups.getMembers",
                &[
                    ("group_id", self.community_id.to_string()),
                    ("fields", "first_name,last_name".to_string()),
                    ("offset", offset.to_string()),
                    ("count", limit.to_string()),
                ],
            )
            .await?;

        Ok(Page {
            total: listing.count,
            items: listing
                .items
                .into_iter()
                .map(|m| Follower {
                    id: UserId(m.id),
                    display_name: format!("{} {}", m.first_name, m.last_name),
                })
                .collect(),
        })
    }

    async fn dialog_page(&self, offset: u64, limit: u64) -> Result<Page<InboundMessage>> {
        let listing: Listing<WireDialog> = self
            .call(
                "messages.getDialogs",
                &[
                    ("unanswered", "1".to_string()),
                    ("preview_length", "20".to_string()),
                    ("offset", offset.to_string()),
                    ("count", limit.to_string()),
                ],
            )
            .await?;

        Ok(Page {
            total: listing.count,
            items: listing
                .items
                .into_iter()
                .map(|d| InboundMessage {
                    sender: UserId(d.message.user_id),
                    body: d.message.body,
                })
                .collect(),
        })
    }

    async fn send_text(&self, user: UserId, text: &str) -> Result<()> {
        // The send call returns the new message id; it is not needed.
        let _id: i64 = self
            .call(
                "messages.send",
                &[
                    ("user_id", user.to_string()),
                    ("message", text.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    async fn upload_image(&self, image: Vec<u8>) -> Result<PhotoRef> {
        let target: UploadTarget = self.call("photos.getMessagesUploadServer", &[]).await?;

        let part = reqwest::multipart::Part::bytes(image).file_name("verse.svg");
        let form = reqwest::multipart::Form::new().part("photo", part);
        let body = self
            .client
            .post(&target.upload_url)
            .multipart(form)
            .send()
            .await?
            .text()
            .await?;
        let receipt: UploadReceipt = serde_json::from_str(&body)?;

        let saved: Vec<SavedPhoto> = self
            .call(
                "photos.saveMessagesPhoto",
                &[
                    ("photo", receipt.photo),
                    ("server", receipt.server.to_string()),
                    ("hash", receipt.hash),
                ],
            )
            .await?;

        let first = saved
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::Malformed("saveMessagesPhoto: empty result".to_string()))?;
        Ok(PhotoRef {
            owner_id: first.owner_id,
            media_id: first.id,
        })
    }

    async fn send_attachment(&self, user: UserId, photo: &PhotoRef) -> Result<()> {
        let _id: i64 = self
            .call(
                "messages.send",
                &[
                    ("user_id", user.to_string()),
                    ("attachment", photo.attachment()),
                ],
            )
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for HttpPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlatform")
            .field("base_url", &self.base_url)
            .field("community_id", &self.community_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_response() {
        let envelope: Envelope<i64> = serde_json::from_str(r#"{"response": 41}"#).unwrap();
        assert_eq!(envelope.response, Some(41));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn envelope_decodes_error() {
        let envelope: Envelope<i64> = serde_json::from_str(
            r#"{"error": {"error_code": 6, "error_msg": "Too many requests per second"}}"#,
        )
        .unwrap();
        let fault = envelope.error.unwrap();
        assert_eq!(fault.error_code, 6);
        assert_eq!(fault.error_msg, "Too many requests per second");
    }

    #[test]
    fn dialog_listing_decodes_nested_messages() {
        let listing: Listing<WireDialog> = serde_json::from_str(
            r#"{"count": 1, "items": [{"message": {"user_id": 9, "body": "winter night"}}]}"#,
        )
        .unwrap();
        assert_eq!(listing.count, 1);
        assert_eq!(listing.items[0].message.user_id, 9);
        assert_eq!(listing.items[0].message.body, "winter night");
    }

    #[test]
    fn member_listing_tolerates_missing_names() {
        let listing: Listing<WireMember> =
            serde_json::from_str(r#"{"count": 1, "items": [{"id": 3}]}"#).unwrap();
        assert_eq!(listing.items[0].id, 3);
        assert_eq!(listing.items[0].first_name, "");
    }
}
