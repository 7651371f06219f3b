//! Complete collection of paginated listings.
//!
//! The platform reports a total alongside every page. The total is re-read on
//! every call and the latest value treated as authoritative, since a listing
//! can change while it is being paged through. A fixed pacing delay runs
//! after every page fetch (including the last) to respect platform rate
//! limits. Transport failures are not retried here; they propagate to the
//! caller.

use std::future::Future;
use std::time::Duration;

use super::api::Page;
use super::error::Result;

/// Fetches a complete listing by walking its pages.
///
/// `fetch` is called with `(offset, limit)` and returns one page plus the
/// server-reported total. The loop continues while the accumulated offset is
/// below the most recently reported total, so the first call always happens.
/// Items are returned in listing order.
pub async fn collect_all<T, F, Fut>(page_size: u64, pacing: Duration, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut total = page_size;
    let mut offset = 0;

    while offset < total {
        let page = fetch(offset, page_size).await?;
        items.extend(page.items);
        total = page.total;
        offset += page_size;
        tokio::time::sleep(pacing).await;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::error::PlatformError;
    use std::sync::Mutex;

    /// A fake paginated source serving `total` numbered items.
    struct FakeSource {
        total: u64,
        calls: Mutex<Vec<(u64, u64)>>,
    }

    impl FakeSource {
        fn new(total: u64) -> Self {
            FakeSource {
                total,
                calls: Mutex::new(Vec::new()),
            }
        }

        async fn fetch(&self, offset: u64, limit: u64) -> Result<Page<u64>> {
            self.calls.lock().unwrap().push((offset, limit));
            let end = (offset + limit).min(self.total);
            Ok(Page {
                items: (offset..end).collect(),
                total: self.total,
            })
        }
    }

    #[tokio::test]
    async fn collects_three_pages_completely_in_order() {
        let source = FakeSource::new(250);

        let items = collect_all(100, Duration::ZERO, |o, l| source.fetch(o, l))
            .await
            .unwrap();

        assert_eq!(items.len(), 250);
        assert_eq!(items, (0..250).collect::<Vec<_>>());
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![(0, 100), (100, 100), (200, 100)]
        );
    }

    #[tokio::test]
    async fn empty_listing_still_makes_one_call() {
        let source = FakeSource::new(0);

        let items = collect_all(100, Duration::ZERO, |o, l| source.fetch(o, l))
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rereads_total_on_every_page() {
        // The listing grows while being paged: the first call reports 100,
        // later calls report 150. The collector must trust the latest total.
        let calls = Mutex::new(0u32);
        let fetch = |offset: u64, limit: u64| {
            let call = {
                let mut c = calls.lock().unwrap();
                *c += 1;
                *c
            };
            async move {
                let total = if call == 1 { 100 } else { 150 };
                let end = (offset + limit).min(total);
                Ok(Page {
                    items: (offset..end).collect::<Vec<u64>>(),
                    total,
                })
            }
        };

        let items = collect_all(100, Duration::ZERO, fetch).await.unwrap();

        assert_eq!(items.len(), 150);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let fetch = |_offset: u64, _limit: u64| async {
            Err::<Page<u64>, _>(PlatformError::api(6, "too many requests"))
        };

        let result = collect_all(100, Duration::ZERO, fetch).await;

        assert!(matches!(result, Err(PlatformError::Api { code: 6, .. })));
    }
}
