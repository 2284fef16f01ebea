// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the lazy promise lifecycle.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The stored executor was invoked because somebody observed the promise.
///
/// # Log Level
/// `debug!` - Lifecycle detail
///
/// # Example
/// ```
/// use lazy_promise::observability::messages::lazy::LazyPromiseMaterialized;
///
/// let msg = LazyPromiseMaterialized {
///     trigger: "catch",
///     value_type: "alloc::string::String",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct LazyPromiseMaterialized<'a> {
    pub trigger: &'a str,
    pub value_type: &'a str,
}

impl Display for LazyPromiseMaterialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Lazy promise<{}> materialized on first '{}' observation",
            self.value_type, self.trigger
        )
    }
}

impl StructuredLog for LazyPromiseMaterialized<'_> {
    fn log(&self) {
        tracing::debug!(
            trigger = self.trigger,
            value_type = self.value_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "materialize",
            span_name = name,
            trigger = self.trigger,
            value_type = self.value_type,
        )
    }
}
