//! Purchase blackout window.
//!
//! Boards play on the Saturday evening draw, so sales close Saturday at
//! 17:00 local time and stay closed through Sunday. The clock and timezone
//! are explicit parameters so the rule is deterministic under test.
use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Timezone the production deployment sells boards in.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Copenhagen;

/// True iff purchases are currently blocked: local Saturday at or after
/// 17:00, or any time on local Sunday.
pub fn is_blocked(now: DateTime<Utc>, timezone: Tz) -> bool {
    let local = now.with_timezone(&timezone);
    match local.weekday() {
        Weekday::Sat => {
            let cutoff = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
            local.time() >= cutoff
        }
        Weekday::Sun => true,
        _ => false,
    }
}

/// Fails with `PurchaseNotAllowed` when inside the blackout window.
pub fn ensure_allowed(now: DateTime<Utc>, timezone: Tz) -> DomainResult<()> {
    if is_blocked(now, timezone) {
        return Err(DomainError::PurchaseNotAllowed(
            "sales are closed from Saturday 17:00 until Monday".to_string(),
        ));
    }
    Ok(())
}
