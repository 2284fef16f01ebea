// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;

use crate::config::{load_config, Config};
use crate::engine::{LazyPromise, Promise, Reject, Resolve};
use crate::errors::{ConfigError, PromiseError};
use crate::traits::ExecutorOutcome;

/// Promise factory carrying one shared configuration.
///
/// Every promise created here, and every promise derived from those, uses the
/// same continuation mode and unhandled-rejection policy.
///
/// # Examples
///
/// ```
/// use lazy_promise::config::{load_config_from_str, ContinuationMode, PromiseRuntime};
///
/// let config = load_config_from_str("continuations: on_demand").unwrap();
/// let runtime = PromiseRuntime::from_config(&config);
///
/// let lazy = runtime.lazy(|resolve, _reject| {
///     resolve.resolve("hello".to_string());
/// });
///
/// assert!(!lazy.is_materialized());
/// assert_eq!(runtime.config().continuations, ContinuationMode::OnDemand);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromiseRuntime {
    config: Arc<Config>,
}

impl PromiseRuntime {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            config: Arc::new(cfg.clone()),
        }
    }

    /// Build a runtime from a YAML, TOML or JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let cfg = load_config(path)?;
        Ok(Self {
            config: Arc::new(cfg),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A lazy promise: `executor` runs on first observation.
    pub fn lazy<T, F, R>(&self, executor: F) -> LazyPromise<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Resolve<T>, Reject<T>) -> R + Send + 'static,
        R: ExecutorOutcome,
    {
        LazyPromise::with_config(executor, Arc::clone(&self.config))
    }

    /// An eager promise: `executor` runs now.
    pub fn promise<T, F, R>(&self, executor: F) -> Promise<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Resolve<T>, Reject<T>) -> R,
        R: ExecutorOutcome,
    {
        Promise::with_config(executor, Arc::clone(&self.config))
    }

    pub fn resolved<T>(&self, value: T) -> Promise<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Promise::resolved_with_config(value, Arc::clone(&self.config))
    }

    pub fn rejected<T>(&self, error: PromiseError) -> Promise<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Promise::rejected_with_config(error, Arc::clone(&self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContinuationMode, RejectionPolicy};
    use std::io::Write;

    #[tokio::test]
    async fn test_derived_promises_inherit_config() {
        let runtime = PromiseRuntime::from_config(&Config {
            continuations: ContinuationMode::OnDemand,
            unhandled_rejections: RejectionPolicy::Ignore,
        });

        let lazy = runtime.lazy(|resolve, _reject| {
            resolve.resolve(3_u32);
        });
        let derived = lazy.and_then(|v| async move { Ok(v * 3) });

        assert_eq!(derived.config(), runtime.config());
        assert_eq!(lazy.promise().config(), runtime.config());
        assert_eq!(derived.await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_eager_promise_runs_executor_now() {
        let runtime = PromiseRuntime::default();
        let promise = runtime.promise(|resolve, _reject| {
            resolve.resolve('x');
        });

        assert_eq!(promise.await.unwrap(), 'x');
    }

    #[tokio::test]
    async fn test_settled_promises_use_runtime_config() {
        let runtime = PromiseRuntime::from_config(&Config {
            continuations: ContinuationMode::OnDemand,
            unhandled_rejections: RejectionPolicy::Ignore,
        });

        let ready = runtime.resolved(5_u32);
        let failed = runtime.rejected::<u32>(PromiseError::msg("quiet"));
        let derived = failed.clone().catch(|_error| async move { Ok(0) });

        assert_eq!(ready.config(), runtime.config());
        assert_eq!(failed.config(), runtime.config());
        assert_eq!(derived.config(), runtime.config());
        assert_eq!(ready.await.unwrap(), 5);
        assert_eq!(derived.await.unwrap(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(b"unhandled_rejections: ignore\n").unwrap();

        let runtime = PromiseRuntime::load(file.path()).unwrap();
        assert_eq!(runtime.config().unhandled_rejections, RejectionPolicy::Ignore);
    }
}
