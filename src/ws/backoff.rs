//! Reconnect delay schedule.
//!
//! The schedule is deterministic: `min(base * 2^(attempt - 1), cap)` with no jitter.

use std::time::Duration;

/// Delay before reconnect `attempt` (1-based). Attempt 0 is treated as attempt 1.
///
/// The result never exceeds `cap`, and saturates instead of overflowing for large attempts.
#[must_use]
pub fn next_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let factor = 1_u32.checked_shl(exponent).unwrap_or(u32::MAX);

    base.checked_mul(factor).unwrap_or(Duration::MAX).min(cap)
}

/// Whether `attempt` consecutive failures have reached the configured maximum.
#[must_use]
pub const fn should_give_up(attempt: u32, max_attempts: u32) -> bool {
    attempt >= max_attempts
}
