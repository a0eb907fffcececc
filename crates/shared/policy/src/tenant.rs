//! Tenant lifecycle: status machine, trial window and the login gate.
//!
//! ```text
//! trial --(upgrade)--> active --(suspend)--> suspended --(activate)--> active
//!   |                                            ^
//!   +--(trial end passed, seen at login)--> expired --(upgrade)--> active
//! ```
//!
//! Trial expiry is detected lazily when a user of the tenant logs in or
//! presents a session; nothing sweeps tenants in the background.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TRIAL_DURATION_DAYS;
use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Trial,
    Active,
    Suspended,
    Expired,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Trial => "trial",
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Expired => "expired",
        }
    }

    /// Admin suspension applies from any state.
    pub fn suspend(self) -> TenantStatus {
        TenantStatus::Suspended
    }

    /// Admin reactivation is only defined for suspended tenants.
    pub fn activate(self) -> DomainResult<TenantStatus> {
        match self {
            TenantStatus::Suspended => Ok(TenantStatus::Active),
            other => Err(DomainError::InvalidTransition(format!(
                "Only suspended tenants can be activated (current status: {})",
                other
            ))),
        }
    }

    /// Owner plan upgrade. This is the only exit from `expired`.
    pub fn upgrade(self) -> DomainResult<TenantStatus> {
        match self {
            TenantStatus::Suspended => Err(DomainError::InvalidTransition(
                "Suspended tenants cannot change plan. Please contact support.".to_string(),
            )),
            _ => Ok(TenantStatus::Active),
        }
    }
}

impl FromStr for TenantStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(TenantStatus::Trial),
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            "expired" => Ok(TenantStatus::Expired),
            other => Err(DomainError::validation(format!("Unknown tenant status '{}'", other))),
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary business a tenant registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Inventory,
    Hotel,
    Landing,
    Expense,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Inventory => "inventory",
            BusinessType::Hotel => "hotel",
            BusinessType::Landing => "landing",
            BusinessType::Expense => "expense",
        }
    }
}

impl FromStr for BusinessType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inventory" => Ok(BusinessType::Inventory),
            "hotel" => Ok(BusinessType::Hotel),
            "landing" => Ok(BusinessType::Landing),
            "expense" => Ok(BusinessType::Expense),
            other => Err(DomainError::validation(format!("Invalid business type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Trial,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
            BillingCycle::Trial => "trial",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "yearly" => Ok(BillingCycle::Yearly),
            "trial" => Ok(BillingCycle::Trial),
            other => Err(DomainError::validation(format!("Unknown billing cycle '{}'", other))),
        }
    }
}

/// Outcome of checking a tenant at login or session validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    Allow,
    /// The trial window has closed: persist `expired`, then reject.
    ExpireTrial,
    Reject(TenantStatus),
}

pub fn login_gate(
    status: TenantStatus,
    trial_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> LoginDecision {
    match status {
        TenantStatus::Suspended | TenantStatus::Expired => LoginDecision::Reject(status),
        TenantStatus::Trial => match trial_end {
            Some(end) if end < now => LoginDecision::ExpireTrial,
            _ => LoginDecision::Allow,
        },
        TenantStatus::Active => LoginDecision::Allow,
    }
}

/// End of a trial that starts at `start`.
pub fn trial_end(start: DateTime<Utc>, duration_days: Option<u32>) -> DateTime<Utc> {
    start + Duration::days(duration_days.unwrap_or(DEFAULT_TRIAL_DURATION_DAYS) as i64)
}

/// Whole days left in a trial, rounded up, never negative.
pub fn days_remaining(trial_end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (trial_end - now).num_seconds();
    if seconds <= 0 {
        0
    } else {
        (seconds + 86_399) / 86_400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspend_from_any_state() {
        for status in [
            TenantStatus::Trial,
            TenantStatus::Active,
            TenantStatus::Suspended,
            TenantStatus::Expired,
        ] {
            assert_eq!(status.suspend(), TenantStatus::Suspended);
        }
    }

    #[test]
    fn test_activate_only_from_suspended() {
        assert_eq!(TenantStatus::Suspended.activate().unwrap(), TenantStatus::Active);
        assert!(TenantStatus::Expired.activate().is_err());
        assert!(TenantStatus::Trial.activate().is_err());
    }

    #[test]
    fn test_upgrade_reopens_expired() {
        assert_eq!(TenantStatus::Expired.upgrade().unwrap(), TenantStatus::Active);
        assert!(TenantStatus::Suspended.upgrade().is_err());
    }

    #[test]
    fn test_login_gate() {
        let now = Utc::now();
        let past = now - Duration::days(1);
        let future = now + Duration::days(1);

        assert_eq!(login_gate(TenantStatus::Trial, Some(future), now), LoginDecision::Allow);
        assert_eq!(login_gate(TenantStatus::Trial, Some(past), now), LoginDecision::ExpireTrial);
        assert_eq!(login_gate(TenantStatus::Active, Some(past), now), LoginDecision::Allow);
        assert_eq!(
            login_gate(TenantStatus::Suspended, None, now),
            LoginDecision::Reject(TenantStatus::Suspended)
        );
        assert_eq!(
            login_gate(TenantStatus::Expired, None, now),
            LoginDecision::Reject(TenantStatus::Expired)
        );
    }

    #[test]
    fn test_trial_window() {
        let start = Utc::now();
        let end = trial_end(start, None);
        assert_eq!((end - start).num_days(), 60);
        assert_eq!(days_remaining(end, start), 60);
        assert_eq!(days_remaining(start, end), 0);
    }
}
