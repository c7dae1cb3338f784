//! Search monitors
//!
//! A [`SearchMonitor`] hears about each attempt and its verdict while a search runs.
//! [`ContinueHandle`] lets a monitor pace a search that has `auto_continue` switched off.

use crate::oracle::Outcome;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct ContinueSignal {
    requested: Mutex<bool>,
    changed: Condvar,
}

/// Handle a monitor uses to ask for the next step.
///
/// Cloneable and `Send`, so it can be passed on to a UI thread.
#[derive(Debug, Clone, Default)]
pub struct ContinueHandle {
    signal: Arc<ContinueSignal>,
}

impl ContinueHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_next(&self) {
        *self.signal.requested.lock() = true;
        self.signal.changed.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        *self.signal.requested.lock()
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        std::mem::take(&mut *self.signal.requested.lock())
    }

    /// Block until a request is pending, [`wake`](Self::wake) is called, or `timeout`
    /// passes. Returns whether a request is pending; it is not consumed.
    pub fn wait_for_request(&self, timeout: Duration) -> bool {
        let mut requested = self.signal.requested.lock();
        if !*requested {
            self.signal.changed.wait_for(&mut requested, timeout);
        }
        *requested
    }

    /// Wake every waiter without posting a request.
    pub fn wake(&self) {
        self.signal.changed.notify_all();
    }
}

/// Receives progress from a running search.
///
/// No guarantee is made about which thread calls these; monitors that feed a UI should
/// redispatch (see [`ChannelMonitor`]).
pub trait SearchMonitor<T> {
    /// A candidate is about to be submitted
    fn on_attempt(&mut self, omitted: &[T], attempt: u64, max_attempts: u128);

    /// A candidate has been judged. Call `next.request_next()` to keep a search with
    /// `auto_continue` disabled going.
    fn on_completed(
        &mut self,
        success: bool,
        omitted: &[T],
        outcome: &Outcome,
        next: &ContinueHandle,
    );

    fn on_status(&mut self, message: &str);

    /// Get name for debugging
    fn name(&self) -> &str {
        "SearchMonitor"
    }
}

impl<T> SearchMonitor<T> for () {
    fn on_attempt(&mut self, _omitted: &[T], _attempt: u64, _max_attempts: u128) {}

    fn on_completed(
        &mut self,
        _success: bool,
        _omitted: &[T],
        _outcome: &Outcome,
        _next: &ContinueHandle,
    ) {
    }

    fn on_status(&mut self, _message: &str) {}
}

impl<T, M: SearchMonitor<T> + ?Sized> SearchMonitor<T> for Box<M> {
    fn on_attempt(&mut self, omitted: &[T], attempt: u64, max_attempts: u128) {
        (**self).on_attempt(omitted, attempt, max_attempts)
    }

    fn on_completed(
        &mut self,
        success: bool,
        omitted: &[T],
        outcome: &Outcome,
        next: &ContinueHandle,
    ) {
        (**self).on_completed(success, omitted, outcome, next)
    }

    fn on_status(&mut self, message: &str) {
        (**self).on_status(message)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Owned copy of a monitor callback
#[derive(Debug, Clone)]
pub enum MonitorEvent<T> {
    Attempt {
        omitted: Vec<T>,
        attempt: u64,
        max_attempts: u128,
    },
    Completed {
        success: bool,
        omitted: Vec<T>,
        outcome: Outcome,
        next: ContinueHandle,
    },
    Status(String),
}

/// Logging monitor that forwards everything to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMonitor;

impl<T: std::fmt::Debug> SearchMonitor<T> for LoggingMonitor {
    fn on_attempt(&mut self, omitted: &[T], attempt: u64, max_attempts: u128) {
        tracing::debug!(attempt, max_attempts, ?omitted, "submitting candidate");
    }

    fn on_completed(
        &mut self,
        success: bool,
        omitted: &[T],
        outcome: &Outcome,
        _next: &ContinueHandle,
    ) {
        match outcome {
            Outcome::OracleError(err) => {
                tracing::warn!(?omitted, %err, "candidate could not be judged")
            }
            _ => tracing::info!(success, ?omitted, "candidate judged"),
        }
    }

    fn on_status(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn name(&self) -> &str {
        "LoggingMonitor"
    }
}

/// Records every callback. Clones share the same log.
#[derive(Debug)]
pub struct RecordingMonitor<T> {
    events: Arc<Mutex<Vec<MonitorEvent<T>>>>,
}

impl<T> Clone for RecordingMonitor<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<T> Default for RecordingMonitor<T> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> RecordingMonitor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MonitorEvent<T>> {
        self.events.lock().clone()
    }

    /// Omitted sets in the order they were submitted.
    pub fn attempts(&self) -> Vec<Vec<T>> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                MonitorEvent::Attempt { omitted, .. } => Some(omitted.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(omitted, outcome)` pairs in completion order.
    pub fn completed(&self) -> Vec<(Vec<T>, Outcome)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                MonitorEvent::Completed { omitted, outcome, .. } => {
                    Some((omitted.clone(), outcome.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                MonitorEvent::Status(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl<T: Clone> SearchMonitor<T> for RecordingMonitor<T> {
    fn on_attempt(&mut self, omitted: &[T], attempt: u64, max_attempts: u128) {
        self.events.lock().push(MonitorEvent::Attempt {
            omitted: omitted.to_vec(),
            attempt,
            max_attempts,
        });
    }

    fn on_completed(
        &mut self,
        success: bool,
        omitted: &[T],
        outcome: &Outcome,
        next: &ContinueHandle,
    ) {
        self.events.lock().push(MonitorEvent::Completed {
            success,
            omitted: omitted.to_vec(),
            outcome: outcome.clone(),
            next: next.clone(),
        });
    }

    fn on_status(&mut self, message: &str) {
        self.events.lock().push(MonitorEvent::Status(message.to_string()));
    }

    fn name(&self) -> &str {
        "RecordingMonitor"
    }
}

type EventCallback<T> = Box<dyn FnMut(MonitorEvent<T>) + Send>;

/// Callback-based monitor
pub struct CallbackMonitor<T> {
    callback: EventCallback<T>,
}

impl<T> CallbackMonitor<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(MonitorEvent<T>) + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl<T: Clone> SearchMonitor<T> for CallbackMonitor<T> {
    fn on_attempt(&mut self, omitted: &[T], attempt: u64, max_attempts: u128) {
        (self.callback)(MonitorEvent::Attempt {
            omitted: omitted.to_vec(),
            attempt,
            max_attempts,
        });
    }

    fn on_completed(
        &mut self,
        success: bool,
        omitted: &[T],
        outcome: &Outcome,
        next: &ContinueHandle,
    ) {
        (self.callback)(MonitorEvent::Completed {
            success,
            omitted: omitted.to_vec(),
            outcome: outcome.clone(),
            next: next.clone(),
        });
    }

    fn on_status(&mut self, message: &str) {
        (self.callback)(MonitorEvent::Status(message.to_string()));
    }

    fn name(&self) -> &str {
        "CallbackMonitor"
    }
}

/// Forwards callbacks over a crossbeam channel so another thread can pick them up.
///
/// A disconnected receiver is not an error: events are dropped and the search goes on.
pub struct ChannelMonitor<T> {
    sender: Sender<MonitorEvent<T>>,
}

impl<T> ChannelMonitor<T> {
    pub fn new(sender: Sender<MonitorEvent<T>>) -> Self {
        Self { sender }
    }

    pub fn unbounded() -> (Self, Receiver<MonitorEvent<T>>) {
        let (sender, receiver) = channel::unbounded();
        (Self::new(sender), receiver)
    }

    fn send(&self, event: MonitorEvent<T>) {
        if self.sender.send(event).is_err() {
            tracing::trace!("monitor receiver disconnected, dropping event");
        }
    }
}

impl<T: Clone> SearchMonitor<T> for ChannelMonitor<T> {
    fn on_attempt(&mut self, omitted: &[T], attempt: u64, max_attempts: u128) {
        self.send(MonitorEvent::Attempt {
            omitted: omitted.to_vec(),
            attempt,
            max_attempts,
        });
    }

    fn on_completed(
        &mut self,
        success: bool,
        omitted: &[T],
        outcome: &Outcome,
        next: &ContinueHandle,
    ) {
        self.send(MonitorEvent::Completed {
            success,
            omitted: omitted.to_vec(),
            outcome: outcome.clone(),
            next: next.clone(),
        });
    }

    fn on_status(&mut self, message: &str) {
        self.send(MonitorEvent::Status(message.to_string()));
    }

    fn name(&self) -> &str {
        "ChannelMonitor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleResult;

    #[test]
    fn test_continue_handle_take() {
        let handle = ContinueHandle::new();
        let shared = handle.clone();
        assert!(!handle.take());
        shared.request_next();
        assert!(handle.is_requested());
        assert!(handle.take());
        assert!(!handle.is_requested());
    }

    #[test]
    fn test_continue_handle_wakes_waiter() {
        let handle = ContinueHandle::new();
        assert!(!handle.wait_for_request(Duration::from_millis(1)));

        let remote = handle.clone();
        let waiter = std::thread::spawn(move || remote.wait_for_request(Duration::from_secs(5)));
        handle.request_next();
        assert!(waiter.join().unwrap());
        assert!(handle.take());
    }

    #[test]
    fn test_recording_monitor_shares_log() {
        let recorder = RecordingMonitor::<u8>::new();
        let mut monitor = recorder.clone();
        monitor.on_attempt(&[1, 2], 1, 8);
        monitor.on_completed(
            false,
            &[1, 2],
            &Outcome::Failure(OracleResult::failure()),
            &ContinueHandle::new(),
        );
        monitor.on_status("done");

        assert_eq!(recorder.attempts(), vec![vec![1, 2]]);
        assert_eq!(recorder.completed().len(), 1);
        assert_eq!(recorder.statuses(), vec!["done".to_string()]);
        recorder.clear();
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_channel_monitor_forwards() {
        let (mut monitor, receiver) = ChannelMonitor::<&str>::unbounded();
        monitor.on_attempt(&["rule_a"], 3, 16);
        match receiver.try_recv().unwrap() {
            MonitorEvent::Attempt { omitted, attempt, max_attempts } => {
                assert_eq!(omitted, vec!["rule_a"]);
                assert_eq!(attempt, 3);
                assert_eq!(max_attempts, 16);
            }
            other => panic!("unexpected event {other:?}"),
        }

        drop(receiver);
        monitor.on_status("receiver gone");
    }

    #[test]
    fn test_callback_monitor_counts() {
        let count = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&count);
        let mut monitor = CallbackMonitor::<u8>::new(move |_| *counter.lock() += 1);
        monitor.on_status("one");
        monitor.on_attempt(&[0], 1, 2);
        assert_eq!(*count.lock(), 2);
    }
}
