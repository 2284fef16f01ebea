// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::type_name;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::config::Config;
use crate::engine::promise::Promise;
use crate::engine::resolvers::{Reject, Resolve};
use crate::errors::{Outcome, PromiseError};
use crate::observability::messages::lazy::LazyPromiseMaterialized;
use crate::observability::messages::StructuredLog;
use crate::traits::ExecutorOutcome;

type BoxedExecutor<T> = Box<dyn FnOnce(Resolve<T>, Reject<T>) -> Result<(), PromiseError> + Send>;

/// A promise whose executor does not run until somebody observes it.
///
/// Construction only stores the executor. The first call to any observation
/// method ([`then`](Self::then), [`and_then`](Self::and_then),
/// [`catch`](Self::catch), [`finally`](Self::finally),
/// [`promise`](Self::promise), or `.await`) materializes an underlying
/// [`Promise`] by running the executor. Every later observation chains onto
/// that same promise, so the executor runs at most once and all observers see
/// the same outcome.
///
/// ```
/// use lazy_promise::LazyPromise;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lazy = LazyPromise::new(|resolve, _reject| {
///     resolve.resolve(42_u32);
/// });
/// assert!(!lazy.is_materialized());
///
/// let doubled = lazy.and_then(|value| async move { Ok(value * 2) });
/// assert!(lazy.is_materialized());
/// assert_eq!(doubled.await.unwrap(), 84);
/// # }
/// ```
///
/// The promise is installed before the executor runs, so an executor that
/// observes its own `LazyPromise` chains onto the pending promise instead of
/// starting a second run.
pub struct LazyPromise<T> {
    executor: Mutex<Option<BoxedExecutor<T>>>,
    materialized: OnceLock<Promise<T>>,
    config: Arc<Config>,
}

impl<T> LazyPromise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Store `executor` without running it, using the default config.
    pub fn new<F, R>(executor: F) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<T>) -> R + Send + 'static,
        R: ExecutorOutcome,
    {
        Self::with_config(executor, Arc::new(Config::default()))
    }

    /// Store `executor` without running it.
    pub fn with_config<F, R>(executor: F, config: Arc<Config>) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<T>) -> R + Send + 'static,
        R: ExecutorOutcome,
    {
        let executor: BoxedExecutor<T> =
            Box::new(move |resolve, reject| executor(resolve, reject).into_outcome());
        Self {
            executor: Mutex::new(Some(executor)),
            materialized: OnceLock::new(),
            config,
        }
    }

    /// Whether the computation has been started.
    pub fn is_materialized(&self) -> bool {
        self.materialized.get().is_some()
    }

    /// Attach fulfillment and rejection handlers. See [`Promise::then`].
    pub fn then<U, S, SFut, F, FFut>(&self, on_fulfilled: S, on_rejected: F) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        S: FnOnce(T) -> SFut + Send + 'static,
        SFut: Future<Output = Outcome<U>> + Send + 'static,
        F: FnOnce(PromiseError) -> FFut + Send + 'static,
        FFut: Future<Output = Outcome<U>> + Send + 'static,
    {
        self.materialize("then").then(on_fulfilled, on_rejected)
    }

    /// Attach a fulfillment handler; a rejection propagates unchanged.
    pub fn and_then<U, S, SFut>(&self, on_fulfilled: S) -> Promise<U>
    where
        U: Clone + Send + Sync + 'static,
        S: FnOnce(T) -> SFut + Send + 'static,
        SFut: Future<Output = Outcome<U>> + Send + 'static,
    {
        self.materialize("and_then").and_then(on_fulfilled)
    }

    /// Attach a rejection handler; a fulfillment propagates unchanged.
    pub fn catch<F, FFut>(&self, on_rejected: F) -> Promise<T>
    where
        F: FnOnce(PromiseError) -> FFut + Send + 'static,
        FFut: Future<Output = Outcome<T>> + Send + 'static,
    {
        self.materialize("catch").catch(on_rejected)
    }

    /// Attach a callback that runs once the computation settles.
    pub fn finally<F>(&self, on_settle: F) -> Promise<T>
    where
        F: FnOnce() + Send + 'static,
    {
        self.materialize("finally").finally(on_settle)
    }

    /// Start the computation if needed and return the underlying promise.
    pub fn promise(&self) -> Promise<T> {
        self.materialize("promise")
    }

    /// Install the pending promise, then run the executor if this call
    /// installed it. No user code runs inside `get_or_init`.
    fn materialize(&self, trigger: &'static str) -> Promise<T> {
        if let Some(promise) = self.materialized.get() {
            return promise.clone();
        }

        let mut installed = None;
        let promise = self
            .materialized
            .get_or_init(|| {
                let (settler, promise) = Promise::pending(Arc::clone(&self.config));
                installed = Some(settler);
                promise
            })
            .clone();

        if let Some(settler) = installed {
            let msg = LazyPromiseMaterialized {
                trigger,
                value_type: type_name::<T>(),
            };
            msg.log();
            let _span = msg.span("lazy_promise").entered();

            let executor = self
                .executor
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            // Dropping an unused settler abandons the promise.
            if let Some(executor) = executor {
                Promise::run_executor(executor, settler);
            }
        }
        promise
    }
}

impl<T> IntoFuture for LazyPromise<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Outcome<T>;
    type IntoFuture = Promise<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.materialize("await")
    }
}

impl<T> IntoFuture for &LazyPromise<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Outcome<T>;
    type IntoFuture = Promise<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.materialize("await")
    }
}

impl<T> fmt::Debug for LazyPromise<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyPromise")
            .field("value_type", &type_name::<T>())
            .field("materialized", &self.materialized.get())
            .finish()
    }
}
