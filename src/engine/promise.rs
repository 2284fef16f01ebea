// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;

use crate::config::{Config, ContinuationMode};
use crate::engine::resolvers::{self, Reject, Resolve, Settler};
use crate::engine::tracker::RejectionTracker;
use crate::errors::{Outcome, PromiseError};
use crate::observability::messages::promise::ContinuationsOnDemand;
use crate::observability::messages::StructuredLog;
use crate::traits::ExecutorOutcome;

type SharedOutcome<T> = Shared<BoxFuture<'static, Outcome<T>>>;

/// Single-resolution, shareable, chainable asynchronous value.
///
/// A `Promise` settles exactly once, either fulfilled with a `T` or rejected
/// with a [`PromiseError`]. Any number of observers can await it, clone it, or
/// chain handlers onto it; all of them see the same outcome.
///
/// ## Executor
///
/// [`Promise::new`] runs the executor immediately, on the calling thread, and
/// hands it a [`Resolve`]/[`Reject`] pair. The executor may settle right away
/// or move the resolvers into spawned work and settle later. Returning `Err`
/// from the executor, or panicking inside it, rejects the promise unless it
/// already settled.
///
/// ## Continuations
///
/// Handlers attached with [`then`](Self::then), [`and_then`](Self::and_then),
/// [`catch`](Self::catch) and [`finally`](Self::finally) produce derived
/// promises. With [`ContinuationMode::Eager`] each promise is driven by a
/// detached task on the current tokio runtime, so handlers run whether or not
/// anybody awaits the derived promise. Without a runtime, or in
/// [`ContinuationMode::OnDemand`], a continuation runs when it is awaited.
///
/// Chaining consumes the handle, like any future combinator. Clone the
/// promise first to attach several handlers to the same outcome.
///
/// A handler that panics rejects its derived promise with
/// [`PromiseError::Panicked`].
pub struct Promise<T> {
    inner: SharedOutcome<T>,
    tracker: Arc<RejectionTracker>,
    config: Arc<Config>,
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a promise and run `executor` right away with the default config.
    pub fn new<F, R>(executor: F) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<T>) -> R,
        R: ExecutorOutcome,
    {
        Self::with_config(executor, Arc::new(Config::default()))
    }

    /// Create a promise and run `executor` right away.
    pub fn with_config<F, R>(executor: F, config: Arc<Config>) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<T>) -> R,
        R: ExecutorOutcome,
    {
        let (settler, promise) = Self::pending(config);
        Self::run_executor(
            move |resolve, reject| executor(resolve, reject).into_outcome(),
            settler,
        );
        promise
    }

    /// A pending promise plus the slot that settles it. No user code runs.
    pub(crate) fn pending(config: Arc<Config>) -> (Arc<Settler<T>>, Self) {
        let (settler, receiver) = resolvers::channel::<T>();
        let promise = Self::from_future(
            async move {
                receiver
                    .await
                    .unwrap_or_else(|_| Err(PromiseError::Abandoned))
            },
            config,
        );
        (settler, promise)
    }

    /// Run `executor` against `settler`. An `Err` return or a panic rejects,
    /// unless the executor already settled.
    pub(crate) fn run_executor<F>(executor: F, settler: Arc<Settler<T>>)
    where
        F: FnOnce(Resolve<T>, Reject<T>) -> Result<(), PromiseError>,
    {
        let resolve = Resolve::new(Arc::clone(&settler));
        let reject = Reject::new(Arc::clone(&settler));

        let run = AssertUnwindSafe(move || executor(resolve, reject));
        let failure = match panic::catch_unwind(run) {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(error),
            Err(payload) => Some(PromiseError::from_panic(payload)),
        };
        if let Some(error) = failure {
            settler.settle(Err(error), "reject");
        }
    }

    /// An already-fulfilled promise with the default config.
    pub fn resolved(value: T) -> Self {
        Self::resolved_with_config(value, Arc::new(Config::default()))
    }

    pub fn resolved_with_config(value: T, config: Arc<Config>) -> Self {
        Self::from_future(future::ready(Ok(value)), config)
    }

    /// An already-rejected promise with the default config.
    pub fn rejected(error: PromiseError) -> Self {
        Self::rejected_with_config(error, Arc::new(Config::default()))
    }

    pub fn rejected_with_config(error: PromiseError, config: Arc<Config>) -> Self {
        Self::from_future(future::ready(Err(error)), config)
    }

    pub(crate) fn from_future<Fut>(future: Fut, config: Arc<Config>) -> Self
    where
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let tracker = Arc::new(RejectionTracker::new(
            config.unhandled_rejections,
            type_name::<T>(),
        ));
        let recorder = Arc::clone(&tracker);

        let inner = async move {
            let outcome = AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(PromiseError::from_panic(payload)));
            if let Err(error) = &outcome {
                recorder.record(error);
            }
            outcome
        }
        .boxed()
        .shared();

        let promise = Self {
            inner,
            tracker,
            config,
        };
        promise.drive();
        promise
    }

    fn drive(&self) {
        if self.config.continuations != ContinuationMode::Eager {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let inner = self.inner.clone();
                handle.spawn(async move {
                    let _ = inner.await;
                });
            }
            Err(_) => ContinuationsOnDemand {
                value_type: type_name::<T>(),
            }
            .log(),
        }
    }

    fn derive<U, Fut>(&self, continuation: Fut) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        Fut: Future<Output = Outcome<U>> + Send + 'static,
    {
        self.tracker.mark_observed();
        Promise::from_future(continuation, Arc::clone(&self.config))
    }

    /// Attach both a fulfillment and a rejection handler.
    ///
    /// Exactly one of them runs. Whatever it returns (a value, an error, or
    /// another promise awaited inside the returned future) settles the
    /// derived promise.
    pub fn then<U, S, SFut, F, FFut>(self, on_fulfilled: S, on_rejected: F) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        S: FnOnce(T) -> SFut + Send + 'static,
        SFut: Future<Output = Outcome<U>> + Send + 'static,
        F: FnOnce(PromiseError) -> FFut + Send + 'static,
        FFut: Future<Output = Outcome<U>> + Send + 'static,
    {
        let source = self.inner.clone();
        self.derive(async move {
            match source.await {
                Ok(value) => on_fulfilled(value).await,
                Err(error) => on_rejected(error).await,
            }
        })
    }

    /// Attach a fulfillment handler only. A rejection passes through unchanged.
    pub fn and_then<U, S, SFut>(self, on_fulfilled: S) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        S: FnOnce(T) -> SFut + Send + 'static,
        SFut: Future<Output = Outcome<U>> + Send + 'static,
    {
        let source = self.inner.clone();
        self.derive(async move {
            match source.await {
                Ok(value) => on_fulfilled(value).await,
                Err(error) => Err(error),
            }
        })
    }

    /// Attach a rejection handler only. A fulfillment passes through unchanged.
    pub fn catch<F, FFut>(self, on_rejected: F) -> Promise<T>
    where
        F: FnOnce(PromiseError) -> FFut + Send + 'static,
        FFut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let source = self.inner.clone();
        self.derive(async move {
            match source.await {
                Ok(value) => Ok(value),
                Err(error) => on_rejected(error).await,
            }
        })
    }

    /// Run `on_settle` once the promise settles, whatever the outcome.
    ///
    /// The derived promise carries the original outcome. It only differs if
    /// `on_settle` panics, in which case it rejects with
    /// [`PromiseError::Panicked`].
    pub fn finally<F>(self, on_settle: F) -> Promise<T>
    where
        F: FnOnce() + Send + 'static,
    {
        let source = self.inner.clone();
        self.derive(async move {
            let outcome = source.await;
            on_settle();
            outcome
        })
    }

    /// The outcome, if the promise has settled and somebody has polled it.
    pub fn peek(&self) -> Option<&Outcome<T>> {
        self.inner.peek()
    }

    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            tracker: Arc::clone(&self.tracker),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> Future for Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.tracker.mark_observed();
        this.inner.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.peek() {
            None => "pending",
            Some(Ok(_)) => "fulfilled",
            Some(Err(_)) => "rejected",
        };
        f.debug_struct("Promise")
            .field("value_type", &type_name::<T>())
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryFutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_executor_runs_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let promise = Promise::new(move |resolve, _reject| {
            counter.fetch_add(1, Ordering::SeqCst);
            resolve.resolve(5_u32);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(promise.await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_resolves_later_from_spawned_task() {
        let promise = Promise::new(|resolve, _reject| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                resolve.resolve("done".to_string());
            });
        });

        assert_eq!(promise.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_executor_err_rejects() {
        let promise: Promise<u32> = Promise::new(|_resolve, _reject| -> anyhow::Result<()> {
            anyhow::bail!("config missing")
        });

        let error = promise.await.unwrap_err();
        assert_eq!(error.to_string(), "Promise rejected: config missing");
    }

    #[tokio::test]
    async fn test_executor_err_after_resolve_is_ignored() {
        let promise = Promise::new(|resolve, _reject| -> anyhow::Result<()> {
            resolve.resolve(1_u8);
            anyhow::bail!("too late")
        });

        assert_eq!(promise.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_executor_panic_rejects() {
        let promise: Promise<u32> = Promise::new(|_resolve, _reject| -> anyhow::Result<()> {
            panic!("executor exploded")
        });

        match promise.await {
            Err(PromiseError::Panicked(message)) => assert_eq!(message, "executor exploded"),
            other => panic!("Expected Panicked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropped_resolvers_abandon() {
        let promise: Promise<u32> = Promise::new(|resolve, reject| {
            drop(resolve);
            drop(reject);
        });

        assert!(matches!(promise.await, Err(PromiseError::Abandoned)));
    }

    #[tokio::test]
    async fn test_all_clones_see_same_outcome() {
        let promise = Promise::resolved(vec![1, 2, 3]);
        let a = promise.clone();
        let b = promise.clone();

        assert_eq!(a.await.unwrap(), vec![1, 2, 3]);
        assert_eq!(b.await.unwrap(), vec![1, 2, 3]);
        assert_eq!(promise.await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_then_picks_fulfillment_branch() {
        let derived = Promise::resolved(20_u32).then(
            |value| async move { Ok(value * 2) },
            |_error| async move { Ok(0) },
        );

        assert_eq!(derived.await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_then_picks_rejection_branch() {
        let derived = Promise::<u32>::rejected(PromiseError::msg("nope")).then(
            |value| async move { Ok(value.to_string()) },
            |error| async move { Ok(format!("recovered from {}", error)) },
        );

        assert_eq!(derived.await.unwrap(), "recovered from Promise rejected: nope");
    }

    #[tokio::test]
    async fn test_and_then_passes_rejection_through() {
        let derived = Promise::<u32>::rejected(PromiseError::Abandoned)
            .and_then(|value| async move { Ok(value + 1) });

        assert!(matches!(derived.await, Err(PromiseError::Abandoned)));
    }

    #[tokio::test]
    async fn test_and_then_can_return_a_promise() {
        let derived = Promise::resolved(3_u32).and_then(|value| Promise::resolved(value * 10));

        assert_eq!(derived.await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_handler_err_rejects_derived() {
        let derived = Promise::resolved(1_u32)
            .and_then(|_value| async move { Err::<u32, _>(PromiseError::msg("handler failed")) });

        assert_eq!(derived.await.unwrap_err().to_string(), "Promise rejected: handler failed");
    }

    #[tokio::test]
    async fn test_handler_panic_rejects_derived() {
        let derived = Promise::resolved(1_u32).and_then(|_value| async move {
            if true {
                panic!("handler exploded");
            }
            Ok(0_u32)
        });

        assert!(matches!(derived.await, Err(PromiseError::Panicked(m)) if m == "handler exploded"));
    }

    #[tokio::test]
    async fn test_catch_passes_fulfillment_through() {
        let derived = Promise::resolved(9_u32).catch(|_error| async move { Ok(0) });

        assert_eq!(derived.await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_finally_keeps_outcome() {
        let settled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&settled);

        let derived = Promise::<u32>::rejected(PromiseError::msg("kept"))
            .finally(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(derived.await.unwrap_err().to_string(), "Promise rejected: kept");
        assert_eq!(settled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_eager_continuation_runs_without_await() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);

        let _derived = Promise::resolved(1_u32).finally(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_on_demand_continuation_waits_for_await() {
        let config = Arc::new(Config {
            continuations: ContinuationMode::OnDemand,
            ..Config::default()
        });
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);

        let source = Promise::with_config(
            |resolve, _reject| {
                resolve.resolve(1_u32);
            },
            config,
        );
        let derived = source.finally(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        assert_eq!(derived.await.unwrap(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chaining_is_not_shadowed_by_future_combinators() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);

        let derived: Promise<u32> = Promise::resolved(2_u32).and_then(move |value| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value * 5)
        });
        let described: Promise<String> = derived.clone().then(
            |value| async move { Ok(value.to_string()) },
            |error| async move { Err(error) },
        );
        let recovered: Promise<u32> = derived.clone().catch(|_error| async move { Ok(0) });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        assert_eq!(derived.clone().map_ok(|value| value + 1).await.unwrap(), 11);
        assert_eq!(described.await.unwrap(), "10");
        assert_eq!(recovered.await.unwrap(), 10);
        assert_eq!(derived.await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_settled_constructors_keep_config() {
        let config = Arc::new(Config {
            continuations: ContinuationMode::OnDemand,
            ..Config::default()
        });

        let fulfilled = Promise::resolved_with_config(1_u32, Arc::clone(&config));
        let rejected = Promise::<u32>::rejected_with_config(PromiseError::Abandoned, config);

        assert_eq!(fulfilled.config().continuations, ContinuationMode::OnDemand);
        assert_eq!(rejected.config().continuations, ContinuationMode::OnDemand);
        assert_eq!(Promise::resolved(1_u32).config(), &Config::default());
        assert_eq!(fulfilled.await.unwrap(), 1);
        assert!(matches!(rejected.await, Err(PromiseError::Abandoned)));
    }

    #[test]
    fn test_works_without_runtime() {
        let promise = Promise::resolved(4_u32).and_then(|value| async move { Ok(value + 1) });

        assert_eq!(futures::executor::block_on(promise).unwrap(), 5);
    }

    #[tokio::test]
    async fn test_peek_and_debug() {
        let promise = Promise::resolved(2_u32);
        assert!(format!("{:?}", promise).contains("value_type"));

        let _ = promise.clone().await;
        assert!(promise.is_settled());
        assert!(matches!(promise.peek(), Some(Ok(2))));
        assert!(format!("{:?}", promise).contains("fulfilled"));
    }
}
