//! Thread-safe observable values and one-shot notifications.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value that is handed out to exactly one reader.
#[derive(Debug)]
pub struct ConsumeOnce<T> {
    value: Mutex<Option<T>>,
}

impl<T> ConsumeOnce<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }

    /// Returns the value the first time it is called, `None` afterwards.
    pub fn take_if_unconsumed(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_consumed(&self) -> bool {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<T: Clone> ConsumeOnce<T> {
    /// Reads the value without consuming it.
    pub fn peek(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Latest-value cell that any number of [`Subscription`]s can watch.
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn update(&self, modify: impl FnOnce(&mut T)) {
        self.tx.send_modify(modify);
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Handle to an [`Observable`]. Dropping it unsubscribes.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next update. `None` once the observable is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stream yielding the current value first, then every update.
    pub fn into_stream(self) -> WatchStream<T> {
        WatchStream::new(self.rx)
    }
}

#[cfg(test)]
#[path = "tests/observable_tests.rs"]
mod tests;
