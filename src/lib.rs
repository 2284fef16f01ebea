// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config + runtime builder
pub mod engine;     // promise primitive + lazy wrapper
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // executor abstractions

pub use config::{Config, PromiseRuntime};
pub use engine::{LazyPromise, Promise, Reject, Resolve};
pub use errors::{Outcome, PromiseError};
