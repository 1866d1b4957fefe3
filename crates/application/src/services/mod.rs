//! Application Services
//!
//! Use-case orchestration over the stores: running benchmarks and accepting
//! uploads.

mod benchmark;
mod upload;

pub use benchmark::*;
pub use upload::*;
