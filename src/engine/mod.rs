pub mod lazy;
pub mod promise;
pub mod resolvers;
mod tracker;

pub use lazy::LazyPromise;
pub use promise::Promise;
pub use resolvers::{Reject, Resolve};
