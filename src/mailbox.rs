//! Bounded, non-blocking hand-off between a producer thread and one consumer.
//!
//! The realtime audio callback, the video frame reader and the now-playing
//! client publish through a mailbox. Producers never block: when the buffer is full the configured
//! [`OverflowPolicy`] decides which item is lost, and the loss is counted.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

/// What a full mailbox does with an incoming item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Keep what is buffered; the new item is discarded.
    DropNewest,
    /// Discard the oldest buffered item to make room for the new one.
    EvictOldest,
}

/// Result of a single [`MailboxSender::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Delivered,
    /// The new item was discarded (`DropNewest`).
    Dropped,
    /// An older item was discarded to make room (`EvictOldest`).
    Evicted,
    /// The consumer is gone.
    Closed,
}

/// Producer half. Cloneable, but each mailbox is meant to have one producer.
#[derive(Debug)]
pub struct MailboxSender<T> {
    tx: Sender<T>,
    // Second receiver handle used only to evict the oldest item.
    evict: Receiver<T>,
    policy: OverflowPolicy,
    dropped: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

/// Consumer half.
#[derive(Debug)]
pub struct MailboxReceiver<T> {
    rx: Receiver<T>,
    dropped: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

/// Create a mailbox holding at most `capacity` items (minimum 1).
pub fn mailbox<T>(capacity: usize, policy: OverflowPolicy) -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (tx, rx) = bounded(capacity.max(1));
    let dropped = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicBool::new(false));
    (
        MailboxSender {
            tx,
            evict: rx.clone(),
            policy,
            dropped: Arc::clone(&dropped),
            closed: Arc::clone(&closed),
        },
        MailboxReceiver {
            rx,
            dropped,
            closed,
        },
    )
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            evict: self.evict.clone(),
            policy: self.policy,
            dropped: Arc::clone(&self.dropped),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> MailboxSender<T> {
    /// Insert without blocking, applying the overflow policy when full.
    pub fn offer(&self, item: T) -> Offer {
        if self.closed.load(Ordering::Acquire) {
            return Offer::Closed;
        }
        match self.tx.try_send(item) {
            Ok(()) => Offer::Delivered,
            Err(TrySendError::Disconnected(_)) => Offer::Closed,
            Err(TrySendError::Full(item)) => match self.policy {
                OverflowPolicy::DropNewest => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    Offer::Dropped
                }
                OverflowPolicy::EvictOldest => self.evict_then_send(item),
            },
        }
    }

    fn evict_then_send(&self, mut item: T) -> Offer {
        // The consumer may drain concurrently, so retry until the send lands.
        loop {
            let evicted = self.evict.try_recv().is_ok();
            if evicted {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            match self.tx.try_send(item) {
                Ok(()) if evicted => return Offer::Evicted,
                Ok(()) => return Offer::Delivered,
                Err(TrySendError::Disconnected(_)) => return Offer::Closed,
                Err(TrySendError::Full(back)) => item = back,
            }
        }
    }

}

impl<T> MailboxReceiver<T> {
    pub fn try_recv(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until an item arrives; `None` once every sender is gone and the buffer is empty.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// The underlying channel, for waiting on it next to other sources in `select!`.
    pub fn channel(&self) -> &Receiver<T> {
        &self.rx
    }

    /// Drop everything currently buffered.
    pub fn clear(&self) {
        while self.rx.try_recv().is_ok() {}
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Items lost to the overflow policy so far.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Drop for MailboxReceiver<T> {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}
