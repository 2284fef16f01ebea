// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failure type carried through the rejection channel of every promise.
//!
//! A promise has a single failure category, "the computation failed". The
//! variants below only record *how* it failed so callers can tell a reported
//! error apart from a panic or from resolvers that went away.

use std::any::Any;
use std::fmt::{Debug, Display};
use std::sync::Arc;
use thiserror::Error;

/// Result of a settled promise.
pub type Outcome<T> = Result<T, PromiseError>;

/// Reason a promise rejected.
///
/// Cloneable so that every observer of a shared promise receives its own copy
/// of the same rejection.
#[derive(Error, Debug, Clone)]
pub enum PromiseError {
    /// The computation reported a failure through `reject`, by returning `Err`
    /// from the executor, or by returning `Err` from a handler.
    #[error("Promise rejected: {0}")]
    Rejected(Arc<anyhow::Error>),

    /// The executor or a handler panicked.
    #[error("Promise task panicked: {0}")]
    Panicked(String),

    /// Every resolver was dropped before the promise settled.
    #[error("Promise abandoned: all resolvers were dropped before settling")]
    Abandoned,
}

impl PromiseError {
    /// Wrap any error (or `anyhow::Error`) as a rejection reason.
    ///
    /// A bare `PromiseError` is returned as is instead of being nested inside
    /// another `Rejected`.
    pub fn rejected(reason: impl Into<anyhow::Error>) -> Self {
        Self::from(reason.into())
    }

    /// Build a rejection from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::Rejected(Arc::new(anyhow::Error::msg(message)))
    }

    /// Convert a caught panic payload into a rejection.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }

    /// The reported failure, if this is a `Rejected` error.
    pub fn reason(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Rejected(reason) => Some(reason.as_ref()),
            _ => None,
        }
    }

    /// Downcast the reported failure to the concrete error the executor used.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.reason().and_then(|reason| reason.downcast_ref::<E>())
    }

    /// Short label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Panicked(_) => "panicked",
            Self::Abandoned => "abandoned",
        }
    }
}

impl From<anyhow::Error> for PromiseError {
    fn from(reason: anyhow::Error) -> Self {
        // Context layered on a PromiseError stays part of the reason.
        let bare = reason
            .chain()
            .next()
            .is_some_and(|outer| outer.is::<PromiseError>());
        if !bare {
            return Self::Rejected(Arc::new(reason));
        }
        match reason.downcast::<PromiseError>() {
            Ok(error) => error,
            Err(reason) => Self::Rejected(Arc::new(reason)),
        }
    }
}
