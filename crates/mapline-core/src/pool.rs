//! Bounded scoped worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Runs `task` over every item on at most `workers` threads.
///
/// Workers pull the next index from a shared cursor. Results come back in
/// item order regardless of completion order. A panicking task is resumed
/// on the calling thread.
pub fn run_indexed<T, R, F>(items: &[T], workers: usize, task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    if workers == 1 {
        return items
            .iter()
            .enumerate()
            .map(|(idx, item)| task(idx, item))
            .collect();
    }

    let cursor = AtomicUsize::new(0);
    let (cursor, task) = (&cursor, &task);
    let mut indexed: Vec<(usize, R)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let idx = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(idx) else {
                            break;
                        };
                        done.push((idx, task(idx, item)));
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(done) => done,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });
    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn results_keep_item_order() {
        let items: Vec<u64> = (0..20).collect();
        let out = run_indexed(&items, 4, |_, item| {
            thread::sleep(Duration::from_millis((20 - item) % 5));
            item * 2
        });
        assert_eq!(out, items.iter().map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn zero_workers_runs_inline() {
        let out = run_indexed(&["a", "b"], 0, |idx, item| format!("{idx}{item}"));
        assert_eq!(out, vec!["0a", "1b"]);
    }
}
