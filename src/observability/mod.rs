// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the crate goes through the message types in
//! [`messages`]. Each message is a plain struct with a `Display` impl for the
//! human-readable line and a [`StructuredLog`](messages::StructuredLog) impl
//! that attaches the same data as structured `tracing` fields.
//!
//! # Usage
//!
//! ```rust
//! use lazy_promise::observability::messages::promise::UnhandledRejection;
//! use lazy_promise::observability::messages::StructuredLog;
//! use lazy_promise::errors::PromiseError;
//!
//! let error = PromiseError::msg("connection refused");
//! let msg = UnhandledRejection {
//!     value_type: "u32",
//!     error: &error,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
