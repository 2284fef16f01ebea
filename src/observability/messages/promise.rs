// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for promise settlement and continuation events.
//!
//! This module contains message types for logging events related to:
//! * Late `resolve`/`reject` calls that lose the settlement race
//! * Resolvers dropped without settling
//! * Continuations that cannot be driven eagerly
//! * Rejections nobody observed

use crate::errors::PromiseError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A `resolve` or `reject` call arrived after the promise had already settled.
///
/// # Log Level
/// `debug!` - Expected under normal operation
///
/// # Example
/// ```
/// use lazy_promise::observability::messages::promise::SettlementIgnored;
///
/// let msg = SettlementIgnored {
///     attempted: "reject",
///     value_type: "u32",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct SettlementIgnored<'a> {
    pub attempted: &'a str,
    pub value_type: &'a str,
}

impl Display for SettlementIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring '{}' on promise<{}>: already settled",
            self.attempted, self.value_type
        )
    }
}

impl StructuredLog for SettlementIgnored<'_> {
    fn log(&self) {
        tracing::debug!(
            attempted = self.attempted,
            value_type = self.value_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "settlement_ignored",
            span_name = name,
            attempted = self.attempted,
            value_type = self.value_type,
        )
    }
}

/// Every resolver was dropped before the promise settled.
///
/// # Log Level
/// `debug!` - The rejection itself reaches observers as `PromiseError::Abandoned`
pub struct ResolversAbandoned<'a> {
    pub value_type: &'a str,
}

impl Display for ResolversAbandoned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "All resolvers for promise<{}> dropped without settling",
            self.value_type
        )
    }
}

impl StructuredLog for ResolversAbandoned<'_> {
    fn log(&self) {
        tracing::debug!(value_type = self.value_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "resolvers_abandoned",
            span_name = name,
            value_type = self.value_type,
        )
    }
}

/// Eager continuations were requested but no tokio runtime is running.
///
/// # Log Level
/// `debug!` - Continuations still run once the promise is awaited
pub struct ContinuationsOnDemand<'a> {
    pub value_type: &'a str,
}

impl Display for ContinuationsOnDemand<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No tokio runtime available, promise<{}> continuation will run when awaited",
            self.value_type
        )
    }
}

impl StructuredLog for ContinuationsOnDemand<'_> {
    fn log(&self) {
        tracing::debug!(value_type = self.value_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "continuations_on_demand",
            span_name = name,
            value_type = self.value_type,
        )
    }
}

/// A rejected promise was dropped and nobody ever observed it.
///
/// # Log Level
/// `warn!` - The failure would otherwise vanish silently
///
/// # Example
/// ```
/// use lazy_promise::errors::PromiseError;
/// use lazy_promise::observability::messages::promise::UnhandledRejection;
///
/// let error = PromiseError::Abandoned;
/// let msg = UnhandledRejection {
///     value_type: "u32",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct UnhandledRejection<'a> {
    pub value_type: &'a str,
    pub error: &'a PromiseError,
}

impl Display for UnhandledRejection<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unhandled promise rejection in promise<{}>: {}",
            self.value_type, self.error
        )
    }
}

impl StructuredLog for UnhandledRejection<'_> {
    fn log(&self) {
        tracing::warn!(
            value_type = self.value_type,
            error_kind = self.error.kind(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unhandled_rejection",
            span_name = name,
            value_type = self.value_type,
            error_kind = self.error.kind(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhandled_rejection_display() {
        let error = PromiseError::msg("timeout");
        let msg = UnhandledRejection {
            value_type: "u32",
            error: &error,
        };

        assert_eq!(
            msg.to_string(),
            "Unhandled promise rejection in promise<u32>: Promise rejected: timeout"
        );
    }

    #[test]
    fn test_settlement_ignored_display() {
        let msg = SettlementIgnored {
            attempted: "resolve",
            value_type: "bool",
        };

        assert_eq!(msg.to_string(), "Ignoring 'resolve' on promise<bool>: already settled");
    }
}
