// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Culprit search driver
//!
//! Pulls candidates from a [`SubsetEnumerator`], renders the kept items, asks the oracle,
//! and reports every attempt to a [`SearchMonitor`]. A failing or panicking renderer or
//! oracle turns into [`Outcome::OracleError`]; the search always moves on to the next
//! candidate.
//!
//! The driver does no locking. Run at most one step at a time per driver, typically from
//! a dedicated worker (see [`spawn_search`](crate::worker::spawn_search)).

use crate::config::SearchConfig;
use crate::enumerator::SubsetEnumerator;
use crate::error::{Result, SearchError};
use crate::monitor::{ContinueHandle, SearchMonitor};
use crate::oracle::{Oracle, OracleResult, Outcome, Renderer};
use crate::report::SearchSummary;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "profiling")]
use tracing::info_span;

/// Cooperative cancellation flag, checked between steps
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Result of [`CulpritSearch::run_one_step`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Attempted { attempt: u64, outcome: Outcome },
    Exhausted,
}

pub struct CulpritSearch<T, A, R, O, M> {
    enumerator: SubsetEnumerator<T>,
    renderer: R,
    oracle: O,
    monitor: M,
    config: SearchConfig,
    next: ContinueHandle,
    summary: SearchSummary<T>,
    kept: Vec<T>,
    omitted: Vec<T>,
    _artifact: PhantomData<fn() -> A>,
}

impl<T, A, R, O, M> CulpritSearch<T, A, R, O, M>
where
    T: Clone,
    R: Renderer<T, A>,
    O: Oracle<A>,
    M: SearchMonitor<T>,
{
    pub fn new(items: Vec<T>, renderer: R, oracle: O, monitor: M) -> Result<Self> {
        Self::with_config(items, renderer, oracle, monitor, SearchConfig::default())
    }

    pub fn with_config(
        items: Vec<T>,
        renderer: R,
        oracle: O,
        monitor: M,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        let enumerator = SubsetEnumerator::with_dedup_limit(items, config.dedup_limit_bits)?;
        let capacity = enumerator.capacity();

        Ok(Self {
            enumerator,
            renderer,
            oracle,
            monitor,
            config,
            next: ContinueHandle::new(),
            summary: SearchSummary::new(),
            kept: Vec::with_capacity(capacity),
            omitted: Vec::with_capacity(capacity),
            _artifact: PhantomData,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn summary(&self) -> &SearchSummary<T> {
        &self.summary
    }

    pub fn enumerator(&self) -> &SubsetEnumerator<T> {
        &self.enumerator
    }

    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut M {
        &mut self.monitor
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Handle passed to the monitor with every completed attempt.
    pub fn continue_handle(&self) -> &ContinueHandle {
        &self.next
    }

    /// Omitted items of the most recent candidate.
    pub fn last_omitted(&self) -> &[T] {
        &self.omitted
    }

    pub fn attempts(&self) -> u64 {
        self.summary.attempts
    }

    /// Submit the next candidate to the oracle.
    pub fn run_one_step(&mut self) -> Step {
        #[cfg(feature = "profiling")]
        let span = info_span!("search.step", attempt = self.summary.attempts + 1);
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        if !self.enumerator.next_into(&mut self.kept, &mut self.omitted) {
            self.report_exhausted();
            return Step::Exhausted;
        }

        let attempt = self.begin_attempt();
        let outcome = match render_guarded(&self.renderer, &self.kept) {
            Ok(artifact) => evaluate_guarded(&self.oracle, &artifact),
            Err(err) => Outcome::OracleError(err),
        };

        let omitted = std::mem::take(&mut self.omitted);
        self.complete_attempt(attempt, &omitted, &outcome);
        self.omitted = omitted;

        Step::Attempted { attempt, outcome }
    }

    /// Step until the enumeration is exhausted, `cancel` fires, the attempt cap is hit, or
    /// (with `auto_continue` off) the monitor does not ask for another step. Can be called
    /// again to resume.
    pub fn run(&mut self, cancel: &CancellationToken) -> SearchSummary<T> {
        // calling run is itself the request to go on
        self.next.take();
        loop {
            if cancel.is_cancelled() {
                self.summary.cancelled = true;
                self.monitor.on_status("search cancelled");
                tracing::info!(attempts = self.summary.attempts, "search cancelled");
                break;
            }
            if self.at_attempt_limit() {
                self.summary.limit_reached = true;
                self.monitor.on_status("attempt limit reached");
                break;
            }
            if self.run_one_step() == Step::Exhausted {
                break;
            }
            if !self.config.auto_continue && !self.next.take() {
                break;
            }
        }

        self.summary.enumerator = self.enumerator.stats();
        self.summary.clone()
    }

    fn at_attempt_limit(&self) -> bool {
        self.config
            .max_attempts
            .is_some_and(|max| self.summary.attempts >= max)
    }

    fn begin_attempt(&mut self) -> u64 {
        self.summary.attempts += 1;
        let attempt = self.summary.attempts;
        self.monitor
            .on_attempt(&self.omitted, attempt, self.enumerator.max_attempts());
        attempt
    }

    fn complete_attempt(&mut self, attempt: u64, omitted: &[T], outcome: &Outcome) {
        if let Outcome::OracleError(err) = outcome {
            tracing::warn!(attempt, %err, "oracle could not judge candidate");
        } else {
            tracing::debug!(attempt, success = outcome.is_success(), "candidate judged");
        }
        self.summary
            .record(omitted, outcome, self.config.culprit_verdict);
        self.monitor
            .on_completed(outcome.is_success(), omitted, outcome, &self.next);
    }

    fn report_exhausted(&mut self) {
        if self.summary.exhausted {
            return;
        }
        self.summary.exhausted = true;
        self.summary.enumerator = self.enumerator.stats();
        let message = format!("search exhausted after {} attempts", self.summary.attempts);
        tracing::info!(attempts = self.summary.attempts, "search exhausted");
        self.monitor.on_status(&message);
    }
}

#[cfg(feature = "parallel")]
impl<T, A, R, O, M> CulpritSearch<T, A, R, O, M>
where
    T: Clone + Send + Sync,
    A: Send + Sync,
    R: Renderer<T, A>,
    O: Oracle<A> + Sync,
    M: SearchMonitor<T>,
{
    /// Evaluate up to `batch_size` candidates with the oracle running in parallel.
    ///
    /// Candidates are drawn and rendered in order, judged concurrently, then reported to the
    /// monitor in the order they were drawn.
    pub fn run_batch(&mut self) -> Vec<Step> {
        use rayon::prelude::*;

        #[cfg(feature = "profiling")]
        let span = info_span!("search.batch", batch_size = self.config.batch_size);
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let mut pending = Vec::with_capacity(self.config.batch_size);
        for _ in 0..self.config.batch_size {
            if !self.enumerator.next_into(&mut self.kept, &mut self.omitted) {
                break;
            }
            let attempt = self.begin_attempt();
            let artifact = render_guarded(&self.renderer, &self.kept);
            pending.push((attempt, self.omitted.clone(), artifact));
        }

        if pending.is_empty() {
            self.report_exhausted();
            return vec![Step::Exhausted];
        }

        let oracle = &self.oracle;
        let outcomes: Vec<Outcome> = pending
            .par_iter()
            .map(|(_, _, artifact)| match artifact {
                Ok(artifact) => evaluate_guarded(oracle, artifact),
                Err(err) => Outcome::OracleError(err.clone()),
            })
            .collect();

        pending
            .into_iter()
            .zip(outcomes)
            .map(|((attempt, omitted, _), outcome)| {
                self.complete_attempt(attempt, &omitted, &outcome);
                Step::Attempted { attempt, outcome }
            })
            .collect()
    }
}

fn render_guarded<T, A, R: Renderer<T, A>>(renderer: &R, kept: &[T]) -> Result<A> {
    panic::catch_unwind(AssertUnwindSafe(|| renderer.render(kept)))
        .unwrap_or_else(|payload| Err(SearchError::Render(panic_message(payload.as_ref()))))
}

fn evaluate_guarded<A, O: Oracle<A>>(oracle: &O, artifact: &A) -> Outcome {
    let result: Result<OracleResult> =
        panic::catch_unwind(AssertUnwindSafe(|| oracle.evaluate(artifact))).unwrap_or_else(
            |payload| Err(SearchError::OraclePanicked(panic_message(payload.as_ref()))),
        );
    Outcome::classify(result)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
