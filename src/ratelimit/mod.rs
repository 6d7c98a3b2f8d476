//! Rate limiting state and decision logic.

mod backend;
mod bucket;
mod descriptor;
mod limiter;
mod store;
pub mod sweeper;
mod window;

pub use backend::{Decision, RateLimiterBackend};
pub use descriptor::{KeyPolicy, PartitionKey, RequestDescriptor};
pub use limiter::{from_config, FixedWindowLimiter, TokenBucketLimiter};
