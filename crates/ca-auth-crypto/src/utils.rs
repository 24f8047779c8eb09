//! Time helpers for account records and session tokens.

use chrono::Utc;

/// Current Unix time in whole seconds, clamped to zero before 1970
pub fn current_timestamp() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
