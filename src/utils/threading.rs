use crate::error::{Error, Result};
use crossbeam_channel::bounded;
use std::thread;

/// Fixed-size pool running one independent job per index.
///
/// Jobs borrow their inputs from the caller, so workers run inside a
/// [`thread::scope`]. Results come back over a bounded channel tagged with
/// their index and are reassembled in index order.
pub struct WorkerPool {
    num_threads: usize,
}

impl WorkerPool {
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Runs `job(i)` for every `i` in `0..count`.
    ///
    /// `on_result` is called on the calling thread as results arrive, in
    /// completion order. The returned vector is in index order.
    pub fn run<T, F, P>(&self, count: usize, job: F, mut on_result: P) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
        P: FnMut(usize, &T),
    {
        let num_workers = self.num_threads.min(count.max(1));
        let (job_tx, job_rx) = bounded::<usize>(num_workers * 2);
        let (result_tx, result_rx) = bounded::<(usize, T)>(num_workers * 2);
        let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();

        thread::scope(|scope| {
            let job = &job;
            let mut handles = Vec::with_capacity(num_workers);
            for _ in 0..num_workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                handles.push(scope.spawn(move || {
                    while let Ok(index) = job_rx.recv() {
                        if result_tx.send((index, job(index))).is_err() {
                            break;
                        }
                    }
                }));
            }
            drop(job_rx);
            drop(result_tx);

            let feeder = scope.spawn(move || {
                for index in 0..count {
                    if job_tx.send(index).is_err() {
                        break;
                    }
                }
            });

            for (index, result) in result_rx.iter() {
                on_result(index, &result);
                slots[index] = Some(result);
            }

            // Join every thread so the scope never re-raises a panic
            let mut first_error = feeder
                .join()
                .err()
                .map(|_| Error::Worker("job feeder panicked".to_string()));
            for (idx, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() && first_error.is_none() {
                    first_error = Some(Error::Worker(format!("worker {} panicked", idx + 1)));
                }
            }
            first_error.map_or(Ok(()), Err)
        })?;

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| Error::Worker(format!("no result for job {}", index)))
            })
            .collect()
    }
}
