pub mod client;
pub mod paginator;
pub mod queries;
pub mod rate_limiter;
pub mod repeat;

pub use client::{GitHubClient, RestOutcome};
pub use paginator::{Collected, Page, Paginator};
pub use rate_limiter::{RateLimitState, RateLimiter};
pub use repeat::{drive, retry, Delay, LoopPolicy, Step};
