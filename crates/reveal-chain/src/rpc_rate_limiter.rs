use std::num::NonZeroU32;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

/// Rate limiter for RPC calls to stay under provider limits.
///
/// If no limit is configured, all calls pass through immediately.
pub(crate) struct RpcRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RpcRateLimiter {
    pub(crate) fn new(requests_per_second: Option<u32>) -> Self {
        let limiter = requests_per_second.and_then(|rps| {
            NonZeroU32::new(rps).map(|rps| RateLimiter::direct(Quota::per_second(rps)))
        });

        Self { limiter }
    }

    pub(crate) async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
