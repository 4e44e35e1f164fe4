//! Single-resolution bridge from partner callbacks to `async` callers.
//!
//! A [`Resolver`] is handed to partner callbacks; the matching [`Pending`] is
//! awaited by the adapter. The first [`Resolver::resolve`] wins. Any value
//! delivered after that is discarded and logged, which covers partner SDKs
//! that fire the same callback more than once. A caller that never gets a
//! callback is released by the timeout passed to [`Pending::wait`]; once the
//! wait ends the slot is closed and late values are handed back as
//! [`Resolution::Abandoned`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use error_stack::Report;
use tokio::sync::oneshot;

use crate::error::AdapterError;

/// Completion handle given to partner callbacks. Cheap to clone; all clones
/// share the same one-shot slot.
pub struct Resolver<T> {
    operation: &'static str,
    sender: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation,
            sender: Arc::clone(&self.sender),
        }
    }
}

/// Awaitable side of a [`Resolver`].
pub struct Pending<T> {
    operation: &'static str,
    receiver: oneshot::Receiver<T>,
}

/// Outcome of [`Resolver::try_resolve`].
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The waiting caller received the value.
    Delivered,
    /// An earlier callback already resolved the operation.
    Duplicate(T),
    /// The caller stopped waiting (timed out or dropped) before the value arrived.
    Abandoned(T),
}

/// Creates a linked resolver/pending pair for one asynchronous operation.
#[must_use]
pub fn channel<T>(operation: &'static str) -> (Resolver<T>, Pending<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Resolver {
            operation,
            sender: Arc::new(Mutex::new(Some(sender))),
        },
        Pending {
            operation,
            receiver,
        },
    )
}

impl<T> Resolver<T> {
    /// Delivers `value` if the operation is still open, handing it back otherwise.
    pub fn try_resolve(&self, value: T) -> Resolution<T> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(sender) = sender else {
            log::warn!(
                "Pangle: ignoring duplicate {} callback, already resolved",
                self.operation
            );
            return Resolution::Duplicate(value);
        };

        match sender.send(value) {
            Ok(()) => Resolution::Delivered,
            Err(value) => {
                log::warn!(
                    "Pangle: {} callback arrived after the caller stopped waiting",
                    self.operation
                );
                Resolution::Abandoned(value)
            }
        }
    }

    /// Delivers `value` if the operation is still open.
    ///
    /// Returns `true` only when the waiting caller received the value.
    pub fn resolve(&self, value: T) -> bool {
        matches!(self.try_resolve(value), Resolution::Delivered)
    }

    /// Whether a callback has already consumed the slot.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<T> Pending<T> {
    /// Waits for the first resolution, up to `timeout`.
    ///
    /// On timeout the slot is closed before returning, so a value that shows
    /// up later is never reported as delivered.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Timeout`] if nothing arrives in time, or
    /// [`AdapterError::InternalError`] if every resolver was dropped without
    /// resolving.
    pub async fn wait(mut self, timeout: Duration) -> Result<T, Report<AdapterError>> {
        let outcome = tokio::time::timeout(timeout, &mut self.receiver).await;
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(Report::new(AdapterError::InternalError {
                message: format!(
                    "partner released the {} callback without calling it",
                    self.operation
                ),
            })),
            Err(_) => {
                self.receiver.close();
                // A value sent between the deadline and `close` still counts.
                if let Ok(value) = self.receiver.try_recv() {
                    return Ok(value);
                }

                log::warn!(
                    "Pangle: no {} callback within {}ms",
                    self.operation,
                    timeout.as_millis()
                );
                Err(Report::new(AdapterError::Timeout {
                    operation: self.operation,
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }))
            }
        }
    }
}
