// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Settlement callbacks handed to an executor.
//!
//! `Resolve` and `Reject` share one [`Settler`] slot holding the sending half
//! of a oneshot channel. Whichever call reaches the slot first takes the
//! sender; every later call finds it empty and is ignored. When the last
//! callback is dropped with the sender still in place, the channel closes and
//! the promise rejects as abandoned.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::errors::{Outcome, PromiseError};
use crate::observability::messages::promise::{ResolversAbandoned, SettlementIgnored};
use crate::observability::messages::StructuredLog;

/// Single-use settlement slot shared by all resolvers of one promise.
pub(crate) struct Settler<T> {
    sender: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
}

impl<T> Settler<T> {
    /// Settle the promise. Returns `false` if it had already settled.
    pub(crate) fn settle(&self, outcome: Outcome<T>, attempted: &str) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                // A closed receiver means nobody holds the promise any more.
                let _ = sender.send(outcome);
                true
            }
            None => {
                SettlementIgnored {
                    attempted,
                    value_type: type_name::<T>(),
                }
                .log();
                false
            }
        }
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<T> Drop for Settler<T> {
    fn drop(&mut self) {
        let unsettled = self
            .sender
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if unsettled {
            ResolversAbandoned {
                value_type: type_name::<T>(),
            }
            .log();
        }
    }
}

/// Create a settlement slot and the receiver the promise listens on.
pub(crate) fn channel<T>() -> (Arc<Settler<T>>, oneshot::Receiver<Outcome<T>>) {
    let (sender, receiver) = oneshot::channel();
    let settler = Settler {
        sender: Mutex::new(Some(sender)),
    };
    (Arc::new(settler), receiver)
}

/// Fulfills the promise it was created for.
///
/// Cloneable and `Send`, so it can be moved into spawned tasks or callbacks.
pub struct Resolve<T> {
    settler: Arc<Settler<T>>,
}

impl<T> Resolve<T> {
    pub(crate) fn new(settler: Arc<Settler<T>>) -> Self {
        Self { settler }
    }

    /// Fulfill the promise with `value`. Ignored if it already settled.
    pub fn resolve(&self, value: T) {
        self.settler.settle(Ok(value), "resolve");
    }

    /// Whether the promise has already been resolved or rejected.
    pub fn is_settled(&self) -> bool {
        self.settler.is_settled()
    }
}

impl<T> Clone for Resolve<T> {
    fn clone(&self) -> Self {
        Self {
            settler: Arc::clone(&self.settler),
        }
    }
}

impl<T> fmt::Debug for Resolve<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("value_type", &type_name::<T>())
            .finish()
    }
}

/// Rejects the promise it was created for.
pub struct Reject<T> {
    settler: Arc<Settler<T>>,
}

impl<T> Reject<T> {
    pub(crate) fn new(settler: Arc<Settler<T>>) -> Self {
        Self { settler }
    }

    /// Reject the promise with any error type. Ignored if it already settled.
    pub fn reject(&self, reason: impl Into<anyhow::Error>) {
        self.reject_with(PromiseError::rejected(reason));
    }

    /// Reject the promise with an already-built [`PromiseError`], e.g. one
    /// received from another promise.
    pub fn reject_with(&self, error: PromiseError) {
        self.settler.settle(Err(error), "reject");
    }

    pub fn is_settled(&self) -> bool {
        self.settler.is_settled()
    }
}

impl<T> Clone for Reject<T> {
    fn clone(&self) -> Self {
        Self {
            settler: Arc::clone(&self.settler),
        }
    }
}

impl<T> fmt::Debug for Reject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("value_type", &type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_settlement_wins() {
        let (settler, receiver) = channel::<u32>();
        let resolve = Resolve::new(Arc::clone(&settler));
        let reject = Reject::new(Arc::clone(&settler));

        assert!(!resolve.is_settled());
        resolve.resolve(1);
        resolve.resolve(2);
        reject.reject(anyhow::anyhow!("too late"));
        assert!(resolve.is_settled());
        assert!(reject.is_settled());

        assert_eq!(receiver.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_the_slot() {
        let (settler, receiver) = channel::<&'static str>();
        let reject = Reject::new(settler);
        let other = reject.clone();

        other.reject_with(PromiseError::Abandoned);
        reject.reject_with(PromiseError::msg("ignored"));

        assert!(matches!(receiver.await.unwrap(), Err(PromiseError::Abandoned)));
    }

    #[tokio::test]
    async fn test_dropping_every_resolver_closes_channel() {
        let (settler, receiver) = channel::<u32>();
        let resolve = Resolve::new(Arc::clone(&settler));
        let reject = Reject::new(settler);

        drop(resolve);
        drop(reject);

        assert!(receiver.await.is_err());
    }

    #[test]
    fn test_settle_after_receiver_dropped_still_counts() {
        let (settler, receiver) = channel::<u32>();
        drop(receiver);

        assert!(settler.settle(Ok(7), "resolve"));
        assert!(!settler.settle(Ok(8), "resolve"));
    }
}
