// Wed Jan 21 2026 - Alex

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    /// Queued plus currently running jobs; `wait` blocks until zero.
    outstanding: usize,
    running: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    work_ready: Condvar,
    all_idle: Condvar,
}

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

/// Worker pool with two primitives: `submit` and `wait`.
///
/// `wait` is a barrier over everything submitted so far, including jobs
/// submitted by running jobs (a job increments the outstanding count before
/// its parent completes, so the barrier cannot clear early). A panicking job
/// logs one diagnostic and is otherwise contained; the barrier always
/// clears. With parallelism disabled `submit` runs the job synchronously.
pub struct TaskPool {
    shared: Option<Arc<Shared>>,
    workers: Vec<Worker>,
}

impl TaskPool {
    pub fn new(thread_count: usize, parallel: bool) -> Self {
        if !parallel || thread_count == 0 {
            return Self {
                shared: None,
                workers: Vec::new(),
            };
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                outstanding: 0,
                running: true,
            }),
            work_ready: Condvar::new(),
            all_idle: Condvar::new(),
        });

        let workers = (0..thread_count)
            .map(|id| {
                let shared = shared.clone();
                Worker {
                    id,
                    handle: Some(thread::spawn(move || Self::worker_loop(id, shared))),
                }
            })
            .collect();

        Self {
            shared: Some(shared),
            workers,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.shared.is_some()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.shared {
            Some(shared) => {
                let mut state = shared.state.lock();
                state.jobs.push_back(Box::new(job));
                state.outstanding += 1;
                drop(state);
                shared.work_ready.notify_one();
            }
            None => run_guarded(Box::new(job)),
        }
    }

    /// Block until every outstanding job has completed.
    pub fn wait(&self) {
        let shared = match &self.shared {
            Some(shared) => shared,
            None => return,
        };
        let mut state = shared.state.lock();
        while state.outstanding > 0 {
            shared.all_idle.wait(&mut state);
        }
    }

    fn worker_loop(_id: usize, shared: Arc<Shared>) {
        loop {
            let job = {
                let mut state = shared.state.lock();
                loop {
                    if let Some(job) = state.jobs.pop_front() {
                        break job;
                    }
                    if !state.running {
                        return;
                    }
                    shared.work_ready.wait(&mut state);
                }
            };

            run_guarded(job);

            let mut state = shared.state.lock();
            state.outstanding -= 1;
            if state.outstanding == 0 {
                shared.all_idle.notify_all();
            }
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        if let Some(shared) = &self.shared {
            shared.state.lock().running = false;
            shared.work_ready.notify_all();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

/// Failures never cross the task boundary: one line to the log, then the
/// worker moves on.
fn run_guarded(job: Job) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown task failure".to_string()
        };
        log::error!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_wait_is_a_barrier() {
        let pool = TaskPool::new(4, true);
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let count = count.clone();
            pool.submit(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(count.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_serial_mode_runs_inline() {
        let pool = TaskPool::new(4, false);
        assert!(!pool.is_parallel());
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        pool.submit(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        // no wait needed; submit was synchronous
        assert_eq!(count.load(Ordering::SeqCst), 1);
        pool.wait();
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let pool = TaskPool::new(2, true);
        let count = Arc::new(AtomicUsize::new(0));

        pool.submit(|| panic!("task exploded"));
        for _ in 0..10 {
            let count = count.clone();
            pool.submit(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_nested_submission_covered_by_wait() {
        let pool = Arc::new(TaskPool::new(4, true));
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let pool2 = pool.clone();
            let count = count.clone();
            pool.submit(move || {
                let inner = count.clone();
                pool2.submit(move || {
                    inner.fetch_add(1, Ordering::SeqCst);
                });
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(count.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_wait_with_nothing_submitted() {
        let pool = TaskPool::new(2, true);
        pool.wait();
        let pool = TaskPool::new(0, true);
        assert!(!pool.is_parallel());
        pool.wait();
    }
}
