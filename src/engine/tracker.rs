// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::RejectionPolicy;
use crate::errors::PromiseError;
use crate::observability::messages::promise::UnhandledRejection;
use crate::observability::messages::StructuredLog;

/// Tracks whether a promise was ever observed and whether it rejected.
///
/// Shared by every clone of one promise and by the promise's own computation.
/// Reports an unhandled rejection when the last reference goes away.
pub(crate) struct RejectionTracker {
    observed: AtomicBool,
    rejection: Mutex<Option<PromiseError>>,
    policy: RejectionPolicy,
    value_type: &'static str,
}

impl RejectionTracker {
    pub(crate) fn new(policy: RejectionPolicy, value_type: &'static str) -> Self {
        Self {
            observed: AtomicBool::new(false),
            rejection: Mutex::new(None),
            policy,
            value_type,
        }
    }

    pub(crate) fn mark_observed(&self) {
        self.observed.store(true, Ordering::Release);
    }

    pub(crate) fn record(&self, error: &PromiseError) {
        let mut slot = self.rejection.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(error.clone());
        }
    }

    fn unhandled(&mut self) -> Option<PromiseError> {
        if self.policy == RejectionPolicy::Ignore || *self.observed.get_mut() {
            return None;
        }
        self.rejection
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for RejectionTracker {
    fn drop(&mut self) {
        if let Some(error) = self.unhandled() {
            UnhandledRejection {
                value_type: self.value_type,
                error: &error,
            }
            .log();
        }
    }
}
