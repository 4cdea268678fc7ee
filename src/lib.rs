pub mod accumulate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod response;
pub mod store;
pub mod transform;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, FailureKind};
