pub mod executor;

pub use executor::ExecutorOutcome;
