//! Process-wide service clock.
//!
//! Timestamps are truncated to microseconds (the precision PostgreSQL
//! stores) and are strictly increasing within a process, so two records
//! created back to back never share a `created_at` and an update always
//! lands after the value it replaces.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use crate::types::Timestamp;

static LAST_MICROS: AtomicI64 = AtomicI64::new(0);

/// Current time, strictly later than any value previously returned.
pub fn now() -> Timestamp {
    let wall = Utc::now().timestamp_micros();
    let mut prev = LAST_MICROS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(prev + 1);
        match LAST_MICROS.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return from_micros(next),
            Err(actual) => prev = actual,
        }
    }
}

/// A timestamp for a mutation of a record last touched at `previous`.
///
/// Records written by an earlier process may carry a wall-clock value ahead
/// of ours; the result is still strictly after `previous`.
pub fn after(previous: Timestamp) -> Timestamp {
    let candidate = now();
    if candidate > previous {
        candidate
    } else {
        from_micros(previous.timestamp_micros() + 1)
    }
}

fn from_micros(micros: i64) -> Timestamp {
    DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_calls_strictly_increase() {
        let mut last = now();
        for _ in 0..1000 {
            let next = now();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn timestamps_have_microsecond_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1000, 0);
    }

    #[test]
    fn after_future_value_still_advances() {
        let future = now() + chrono::Duration::hours(1);
        let bumped = after(future);
        assert!(bumped > future);
        assert_eq!((bumped - future).num_microseconds(), Some(1));
    }
}
