//! Admission gate for outbound assistant requests.
//!
//! Two rules, checked in order: a minimum spacing between consecutive
//! accepted requests, then a per-window quota. Each acceptance re-arms a
//! reset deadline one window after itself; the counter zeroes when that
//! deadline passes. This is a fixed-delay window, not a sliding one: a
//! burst shortly after a reset can momentarily exceed what a true sliding
//! window would allow. That matches the behavior this gate is specified to
//! have and is a documented approximation, not a bug.
//!
//! Rejections are advisory. The gate never consumes or stores the attempted
//! message; the caller surfaces the reason and retry timing and keeps the
//! input for resending.

use chrono::{DateTime, Duration, Utc};

/// Minimum spacing between accepted requests
const COOLDOWN_MS: i64 = 1000;

/// Accepted requests allowed per window
const MAX_PER_WINDOW: u32 = 5;

/// Window length armed by each acceptance
const WINDOW_SECS: i64 = 60;

/// Advisory wait returned with quota rejections
const QUOTA_RETRY_SECS: u64 = 5;

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Cooldown,
    Quota,
}

/// A rejected admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectReason,
    /// Advisory wait in whole seconds (rounded up)
    pub retry_after_secs: u64,
}

/// Mutable admission state. Not persisted across sessions.
#[derive(Debug, Default)]
pub struct RequestGate {
    last_accepted: Option<DateTime<Utc>>,
    count_in_window: u32,
    reset_at: Option<DateTime<Utc>>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a request at `now` may proceed, updating state on
    /// acceptance.
    pub fn try_admit(&mut self, now: DateTime<Utc>) -> Result<(), Rejection> {
        // The reset deadline is applied lazily instead of by a timer task,
        // so nothing fires after the owner is torn down.
        if let Some(reset_at) = self.reset_at {
            if now >= reset_at {
                self.count_in_window = 0;
                self.reset_at = None;
            }
        }

        if let Some(last) = self.last_accepted {
            let elapsed_ms = (now - last).num_milliseconds();
            if elapsed_ms < COOLDOWN_MS {
                let wait_ms = COOLDOWN_MS - elapsed_ms;
                return Err(Rejection {
                    reason: RejectReason::Cooldown,
                    retry_after_secs: (wait_ms.max(0) as u64).div_ceil(1000),
                });
            }
        }

        if self.count_in_window >= MAX_PER_WINDOW {
            return Err(Rejection {
                reason: RejectReason::Quota,
                retry_after_secs: QUOTA_RETRY_SECS,
            });
        }

        self.last_accepted = Some(now);
        self.count_in_window += 1;
        self.reset_at = Some(now + Duration::seconds(WINDOW_SECS));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap()
    }

    #[test]
    fn test_first_request_is_admitted() {
        let mut gate = RequestGate::new();
        assert!(gate.try_admit(at_ms(0)).is_ok());
    }

    #[test]
    fn test_cooldown_rejects_with_rounded_up_wait() {
        let mut gate = RequestGate::new();
        gate.try_admit(at_ms(0)).unwrap();

        let rejection = gate.try_admit(at_ms(500)).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::Cooldown);
        assert_eq!(rejection.retry_after_secs, 1);
    }

    #[test]
    fn test_admitted_after_cooldown_elapses() {
        let mut gate = RequestGate::new();
        gate.try_admit(at_ms(0)).unwrap();
        assert!(gate.try_admit(at_ms(1001)).is_ok());
    }

    #[test]
    fn test_sixth_request_in_window_hits_quota() {
        let mut gate = RequestGate::new();
        // Five admissions, each satisfying the cooldown.
        for i in 0..5 {
            assert!(gate.try_admit(at_ms(i * 1100)).is_ok(), "request {}", i);
        }

        let rejection = gate.try_admit(at_ms(5 * 1100)).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::Quota);
        assert_eq!(rejection.retry_after_secs, 5);
    }

    #[test]
    fn test_quota_rejection_does_not_extend_window() {
        let mut gate = RequestGate::new();
        for i in 0..5 {
            gate.try_admit(at_ms(i * 1100)).unwrap();
        }
        // Last acceptance at 4.4s arms a reset at 64.4s.
        assert!(gate.try_admit(at_ms(10_000)).is_err());
        assert!(gate.try_admit(at_ms(64_500)).is_ok());
    }

    #[test]
    fn test_counter_zeroes_after_window() {
        let mut gate = RequestGate::new();
        gate.try_admit(at_ms(0)).unwrap();
        gate.try_admit(at_ms(1100)).unwrap();

        // Well past the 60s deadline armed by the last acceptance.
        assert!(gate.try_admit(at_ms(62_000)).is_ok());
        assert!(gate.try_admit(at_ms(63_200)).is_ok());
    }

    #[test]
    fn test_cooldown_checked_before_quota() {
        let mut gate = RequestGate::new();
        for i in 0..5 {
            gate.try_admit(at_ms(i * 1100)).unwrap();
        }
        // Both rules would reject here; the cooldown reason wins.
        let rejection = gate.try_admit(at_ms(4 * 1100 + 200)).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::Cooldown);
    }

    #[test]
    fn test_rejection_leaves_state_unchanged() {
        let mut gate = RequestGate::new();
        gate.try_admit(at_ms(0)).unwrap();
        let _ = gate.try_admit(at_ms(100));
        // The rejected attempt neither advanced the cooldown nor the count.
        assert!(gate.try_admit(at_ms(1001)).is_ok());
    }
}
