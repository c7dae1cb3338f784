//! Background search worker
//!
//! Runs a [`CulpritSearch`] on its own thread so a slow oracle never blocks the caller.
//! Pair it with a [`ChannelMonitor`](crate::monitor::ChannelMonitor) to receive progress
//! on another thread.

use crate::driver::{CancellationToken, CulpritSearch};
use crate::error::{Result, SearchError};
use crate::monitor::{ContinueHandle, SearchMonitor};
use crate::oracle::{Oracle, Renderer};
use crate::report::SearchSummary;
use std::thread::{self, JoinHandle};
use std::time::Duration;

// upper bound on how long a cancel through a bare token clone can go unnoticed
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to a search running on a worker thread
pub struct SearchHandle<T> {
    token: CancellationToken,
    next: ContinueHandle,
    thread: JoinHandle<SearchSummary<T>>,
}

impl<T> SearchHandle<T> {
    /// Ask the worker to stop after the step in flight.
    pub fn cancel(&self) {
        self.token.cancel();
        self.next.wake();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and return its final summary.
    pub fn join(self) -> Result<SearchSummary<T>> {
        self.thread.join().map_err(|_| SearchError::WorkerPanicked)
    }
}

/// Move `search` onto a dedicated thread and drive it until it finishes or `token` fires.
///
/// With `auto_continue` disabled the worker blocks between steps until the monitor calls
/// [`ContinueHandle::request_next`] or the search is cancelled.
pub fn spawn_search<T, A, R, O, M>(
    mut search: CulpritSearch<T, A, R, O, M>,
    token: CancellationToken,
) -> Result<SearchHandle<T>>
where
    T: Clone + Send + 'static,
    A: 'static,
    R: Renderer<T, A> + Send + 'static,
    O: Oracle<A> + Send + 'static,
    M: SearchMonitor<T> + Send + 'static,
{
    let worker_token = token.clone();
    let next = search.continue_handle().clone();
    let thread = thread::Builder::new()
        .name("culprit-search".into())
        .spawn(move || loop {
            let summary = search.run(&worker_token);
            if summary.is_finished() || search.config().auto_continue {
                return summary;
            }
            let waiting = search.continue_handle();
            while !waiting.wait_for_request(CANCEL_CHECK_INTERVAL) {
                if worker_token.is_cancelled() {
                    break;
                }
            }
        })?;

    tracing::debug!("culprit search worker started");
    Ok(SearchHandle {
        token,
        next,
        thread,
    })
}
