use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use stride_config::MessageRateLimit;

use crate::error::ApiError;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(86_400);

/// Process-wide cap on chat messages, per minute and per day
pub struct MessageLimiter {
    per_minute: DefaultDirectRateLimiter,
    per_day: DefaultDirectRateLimiter,
}

impl MessageLimiter {
    pub fn new(config: &MessageRateLimit) -> anyhow::Result<Self> {
        Ok(Self {
            per_minute: RateLimiter::direct(quota(config.messages_per_minute, MINUTE)?),
            per_day: RateLimiter::direct(quota(config.messages_per_day, DAY)?),
        })
    }

    /// Take one message from both budgets
    pub fn check(&self) -> Result<(), ApiError> {
        let clock = DefaultClock::default();

        if let Err(not_until) = self.per_minute.check() {
            let retry_after = not_until.wait_time_from(clock.now()).as_secs().max(1);
            return Err(ApiError::RateLimited {
                retry_after,
                message: format!("Too many messages. Try again in {retry_after} seconds."),
            });
        }

        if self.per_day.check().is_err() {
            return Err(ApiError::RateLimited {
                retry_after: DAY.as_secs(),
                message: "Daily message limit reached. Try again tomorrow.".to_owned(),
            });
        }

        Ok(())
    }
}

fn quota(max_messages: u32, window: Duration) -> anyhow::Result<Quota> {
    let burst = NonZeroU32::new(max_messages).ok_or_else(|| anyhow::anyhow!("message rate limits must be > 0"))?;
    let period = window / burst.get();

    Ok(Quota::with_period(period)
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit period"))?
        .allow_burst(burst))
}
