//! Bounded worker pool for the compose phase.
//!
//! Tasks receive owned, immutable inputs and return pure results; no shared
//! mutable state crosses the pool boundary. Results come back in submission
//! order regardless of completion order. A task that panics is isolated: its
//! slot is `None` and every sibling task still runs.
//!
//! With a single worker the inputs run sequentially on the calling task,
//! with the same panic isolation.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::error;

/// Maps `task` over `inputs` on at most `workers` parallel workers.
///
/// The returned vector has one slot per input, in submission order; a slot is
/// `None` when its task panicked.
pub async fn map_ordered<T, R, F>(workers: usize, inputs: Vec<T>, task: F) -> Vec<Option<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    if workers <= 1 {
        return inputs
            .into_iter()
            .map(|input| {
                std::panic::catch_unwind(AssertUnwindSafe(|| task(input)))
                    .map_err(|_| error!("compose task panicked"))
                    .ok()
            })
            .collect();
    }

    let task = Arc::new(task);
    let semaphore = Arc::new(Semaphore::new(workers));

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let task = Arc::clone(&task);
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only fails if
                // the pool is torn down mid-run.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                match tokio::task::spawn_blocking(move || task(input)).await {
                    Ok(result) => Some(result),
                    Err(join_error) => {
                        error!(%join_error, "compose task failed");
                        None
                    }
                }
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                error!(%join_error, "compose task join failed");
                None
            }
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn results_come_back_in_submission_order() {
        let inputs: Vec<u64> = (0..32).collect();

        let results = map_ordered(4, inputs, |n| {
            // Later submissions finish earlier.
            std::thread::sleep(std::time::Duration::from_millis(32 - n));
            n * 10
        })
        .await;

        let expected: Vec<Option<u64>> = (0..32).map(|n| Some(n * 10)).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panicking_task_is_isolated() {
        let results = map_ordered(3, vec![1, 2, 3, 4], |n| {
            if n == 2 {
                panic!("boom");
            }
            n
        })
        .await;

        assert_eq!(results, vec![Some(1), None, Some(3), Some(4)]);
    }

    #[tokio::test]
    async fn single_worker_runs_sequentially_with_isolation() {
        let results = map_ordered(1, vec![1, 2, 3], |n| {
            if n == 3 {
                panic!("boom");
            }
            n + 100
        })
        .await;

        assert_eq!(results, vec![Some(101), Some(102), None]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_input_yields_empty_output() {
        let results = map_ordered(4, Vec::<u32>::new(), |n| n).await;
        assert!(results.is_empty());
    }
}
