//! Block selection and fan-out recipient computation.
//!
//! Walks the ranked candidates in order and picks the first one with no
//! fragment overlap against the requester's delivered set, then decides who
//! the composition fans out to. Author cache entries are touched (lazily
//! created) during eligibility evaluation even when the author does not
//! qualify; every entry referenced later during delivery therefore already
//! exists, and the creation timestamp feeds the recency gate on later runs.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::cache::UsedCache;
use crate::config::Config;
use crate::types::{CompositionCandidate, Followers, UserId};

/// A selected composition and the recipients it fans out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Everyone the composition will be delivered to.
    pub recipients: BTreeSet<UserId>,

    /// The flattened fragment texts, in delivery order.
    pub post: Vec<String>,
}

/// Picks the first fresh candidate and computes its recipient set.
///
/// Returns `None` when every candidate overlaps the requester's delivered
/// set; the caller replies with the fixed no-blocks text.
///
/// Recipients always include the requester and the configured testers. With
/// spam mode enabled, each fragment's author is added when they are a current
/// follower, their own delivered set does not intersect the candidate, and
/// their last cache mutation is older than the configured auto-reply delay.
pub fn select_block(
    cache: &mut UsedCache,
    followers: &Followers,
    config: &Config,
    now: DateTime<Utc>,
    requester: UserId,
    candidates: &[CompositionCandidate],
) -> Option<Selection> {
    let requester_delivered = cache.touch(requester, now).delivered.clone();

    for candidate in candidates {
        let post_set = candidate.text_set();
        if !requester_delivered.is_disjoint(&post_set) {
            continue;
        }

        let mut recipients: BTreeSet<UserId> = config.tester_ids.clone();
        recipients.insert(requester);

        if config.spam_mode {
            for fragment in &candidate.fragments {
                let author = fragment.author;
                if !followers.contains(author) {
                    continue;
                }
                let entry = cache.touch(author, now);
                let idle = now - entry.last_mutation;
                if entry.delivered.is_disjoint(&post_set) && idle > config.auto_reply_delay {
                    recipients.insert(author);
                }
            }
        }

        // Testers go in unconditionally a second time; set semantics absorb
        // the duplicates.
        recipients.extend(config.tester_ids.iter().copied());

        return Some(Selection {
            recipients,
            post: candidate.post(),
        });
    }

    None
}
