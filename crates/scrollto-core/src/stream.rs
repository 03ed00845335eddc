//! Replaying multicast stream of scroll positions
//!
//! A [`PositionStream`] buffers the most recent positions so a subscriber that
//! arrives after the animation already emitted (or even finished) still sees
//! them, then the terminal state. It completes at most once and fails at most
//! once; anything emitted after termination is dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::error::Error;

/// Number of positions replayed to late subscribers
pub const REPLAY_CAPACITY: usize = 256;

/// One item delivered to a subscriber
pub type StreamItem = Result<f64, Arc<Error>>;

#[derive(Debug, Clone)]
enum Terminal {
    Completed,
    Failed(Arc<Error>),
}

struct StreamInner {
    replay: VecDeque<f64>,
    capacity: usize,
    terminal: Option<Terminal>,
    observers: Vec<UnboundedSender<StreamItem>>,
}

/// Handle to a position stream; clones share the same stream
#[derive(Clone)]
pub struct PositionStream {
    inner: Arc<Mutex<StreamInner>>,
}

impl Default for PositionStream {
    fn default() -> Self {
        Self::with_capacity(REPLAY_CAPACITY)
    }
}

impl PositionStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StreamInner {
                replay: VecDeque::with_capacity(capacity.min(REPLAY_CAPACITY)),
                capacity: capacity.max(1),
                terminal: None,
                observers: Vec::new(),
            })),
        }
    }

    /// A stream that has already completed without emitting
    pub fn completed() -> Self {
        let stream = Self::new();
        stream.complete();
        stream
    }

    /// A stream that has already failed with `error`
    pub fn failed(error: Error) -> Self {
        let stream = Self::new();
        stream.fail(error);
        stream
    }

    fn lock(&self) -> MutexGuard<'_, StreamInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a position to every subscriber and into the replay buffer
    pub(crate) fn emit(&self, position: f64) {
        let mut inner = self.lock();
        if inner.terminal.is_some() {
            return;
        }
        if inner.replay.len() == inner.capacity {
            inner.replay.pop_front();
        }
        inner.replay.push_back(position);
        inner.observers.retain(|tx| tx.send(Ok(position)).is_ok());
    }

    /// Complete the stream. Returns false if it had already terminated.
    pub(crate) fn complete(&self) -> bool {
        let mut inner = self.lock();
        if inner.terminal.is_some() {
            return false;
        }
        inner.terminal = Some(Terminal::Completed);
        // Dropping the senders closes every subscription
        inner.observers.clear();
        true
    }

    /// Fail the stream. Returns false if it had already terminated.
    pub(crate) fn fail(&self, error: Error) -> bool {
        let mut inner = self.lock();
        if inner.terminal.is_some() {
            return false;
        }
        let error = Arc::new(error);
        for tx in inner.observers.drain(..) {
            let _ = tx.send(Err(error.clone()));
        }
        inner.terminal = Some(Terminal::Failed(error));
        true
    }

    /// Subscribe, receiving buffered positions first
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();

        for &position in &inner.replay {
            let _ = tx.send(Ok(position));
        }

        match inner.terminal.clone() {
            None => inner.observers.push(tx),
            Some(Terminal::Completed) => {}
            Some(Terminal::Failed(error)) => {
                let _ = tx.send(Err(error.clone()));
            }
        }

        Subscription {
            rx,
            finished: false,
        }
    }

    /// Whether the stream has completed or failed
    pub fn is_terminated(&self) -> bool {
        self.lock().terminal.is_some()
    }

    /// Whether the stream terminated with an error
    pub fn error(&self) -> Option<Arc<Error>> {
        match &self.lock().terminal {
            Some(Terminal::Failed(error)) => Some(error.clone()),
            _ => None,
        }
    }

    /// Most recently emitted position
    pub fn latest(&self) -> Option<f64> {
        self.lock().replay.back().copied()
    }
}

/// Receiving end of a [`PositionStream`]
pub struct Subscription {
    rx: UnboundedReceiver<StreamItem>,
    finished: bool,
}

impl Subscription {
    /// Wait for the next item; `None` once the stream has terminated
    pub async fn next(&mut self) -> Option<StreamItem> {
        let item = self.rx.recv().await;
        if item.is_none() {
            self.finished = true;
        }
        item
    }

    /// Take every item available right now without waiting
    pub fn drain(&mut self) -> Vec<StreamItem> {
        let mut items = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(item) => items.push(item),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
        items
    }

    /// Whether the end of the stream has been observed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the stream to terminate and return every position
    pub async fn collect(mut self) -> Result<Vec<f64>, Arc<Error>> {
        let mut positions = Vec::new();
        while let Some(item) = self.next().await {
            positions.push(item?);
        }
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(items: Vec<StreamItem>) -> Vec<f64> {
        items.into_iter().map(|i| i.unwrap()).collect()
    }

    #[test]
    fn test_live_subscriber_receives_emissions() {
        let stream = PositionStream::new();
        let mut sub = stream.subscribe();

        stream.emit(1.0);
        stream.emit(2.0);

        assert_eq!(positions(sub.drain()), vec![1.0, 2.0]);
        assert!(!sub.is_finished());
    }

    #[test]
    fn test_late_subscriber_gets_replay_and_completion() {
        let stream = PositionStream::new();
        stream.emit(10.0);
        stream.emit(20.0);
        assert!(stream.complete());

        let mut sub = stream.subscribe();
        assert_eq!(positions(sub.drain()), vec![10.0, 20.0]);
        assert!(sub.is_finished());
        assert_eq!(stream.latest(), Some(20.0));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let stream = PositionStream::new();
        let mut sub = stream.subscribe();

        assert!(stream.complete());
        assert!(!stream.complete());
        assert!(!stream.fail(Error::TargetNotFound("x".into())));

        stream.emit(5.0);
        assert!(sub.drain().is_empty());
        assert!(sub.is_finished());
        assert!(stream.error().is_none());
    }

    #[test]
    fn test_failure_reaches_every_subscriber_once() {
        let stream = PositionStream::new();
        let mut early = stream.subscribe();

        stream.fail(Error::ContainerNotFound("#panel".into()));
        let mut late = stream.subscribe();

        for sub in [&mut early, &mut late] {
            let items = sub.drain();
            assert_eq!(items.len(), 1);
            assert!(matches!(&**items[0].as_ref().unwrap_err(), Error::ContainerNotFound(_)));
            assert!(sub.is_finished());
        }
        assert!(stream.is_terminated());
    }

    #[test]
    fn test_replay_buffer_keeps_latest() {
        let stream = PositionStream::with_capacity(3);
        for i in 0..5 {
            stream.emit(i as f64);
        }
        stream.complete();

        let mut sub = stream.subscribe();
        assert_eq!(positions(sub.drain()), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let stream = PositionStream::new();
        let sub = stream.subscribe();
        drop(sub);

        stream.emit(1.0);
        assert!(stream.lock().observers.is_empty());
    }

    #[tokio::test]
    async fn test_collect_waits_for_completion() {
        let stream = PositionStream::new();
        let sub = stream.subscribe();

        let producer = stream.clone();
        tokio::spawn(async move {
            producer.emit(3.0);
            producer.emit(4.0);
            producer.complete();
        });

        assert_eq!(sub.collect().await.unwrap(), vec![3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_collect_surfaces_failure() {
        let stream = PositionStream::failed(Error::TargetNotFound("'#nope'".into()));
        let err = stream.subscribe().collect().await.unwrap_err();
        assert!(matches!(&*err, Error::TargetNotFound(_)));
    }
}
