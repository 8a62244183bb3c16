//! Scatter/gather over scoped threads.
//!
//! Every tree-wide pass (extraction, injection, content repair, preview) hands
//! its files to [`scatter_gather`]. Workers own their partial results; the
//! caller merges them after the join, so no lock is shared between workers.

use std::num::NonZeroUsize;
use std::thread;

fn worker_count(items: usize) -> usize {
    let available = thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(4);
    available.min(items).max(1)
}

/// Applies `task` to every item on a bounded set of scoped threads.
///
/// Results are returned in the order of `items`. Returns only once every
/// task has finished. A task that panics yields `None` in its slot.
pub fn scatter_gather<T, R, F>(items: &[T], task: F) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }
    let chunk_size = items.len().div_ceil(worker_count(items.len()));
    let task = &task;

    thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|item| {
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| task(item))).ok()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(items.chunks(chunk_size))
            .flat_map(|(handle, chunk)| {
                handle.join().unwrap_or_else(|_| chunk.iter().map(|_| None).collect())
            })
            .collect()
    })
}
