//! Seams to the external location provider and scoring oracle.
//!
//! Both collaborators are black boxes that may be slow or fail. The traits
//! are synchronous so worker threads can block on them directly; callers
//! decide how much parallelism to throw at a slow provider.

mod error;
mod traits;

pub use error::ProviderError;
pub use traits::{LocationProvider, RewardOracle};
