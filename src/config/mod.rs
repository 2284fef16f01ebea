// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;

pub use loader::{load_config, load_config_from_str, Config, ContinuationMode, RejectionPolicy};
pub use runtime::PromiseRuntime;
