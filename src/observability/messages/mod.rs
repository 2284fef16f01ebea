// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by the component that emits them:
//!
//! * `lazy` - Deferred executor lifecycle (materialization)
//! * `promise` - Settlement, continuation driving and unhandled rejections
//!
//! # Usage Pattern
//!
//! ```rust
//! use lazy_promise::observability::messages::lazy::LazyPromiseMaterialized;
//!
//! let msg = LazyPromiseMaterialized {
//!     trigger: "then",
//!     value_type: "u32",
//! };
//!
//! tracing::debug!("{}", msg);
//! ```

use tracing::Span;

pub mod lazy;
pub mod promise;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
