//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Plans & Trials
// =============================================================================

/// Name of the plan assigned to every newly registered tenant
pub const TRIAL_PLAN_NAME: &str = "trial";

/// Trial length used when the trial plan does not set `trialDurationDays`
pub const DEFAULT_TRIAL_DURATION_DAYS: u32 = 60;

/// Wire sentinel for an unlimited plan limit
pub const UNLIMITED_SENTINEL: i64 = -1;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Coupon codes are stored and compared in this normalized form
pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}
