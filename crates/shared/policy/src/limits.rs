//! Plan limits and the resolver that merges plan defaults with tenant overrides.
//!
//! Plans store their features as an open JSON object where `-1` means
//! unlimited. On the way in that object is parsed into [`PlanFeatures`], and
//! the sentinel becomes [`Limit::Unlimited`] so that no code path ever compares
//! against `-1` as a number.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::UNLIMITED_SENTINEL;
use crate::error::{DomainError, DomainResult};

/// A single plan limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    Bounded(u64),
}

impl Limit {
    /// Parse the wire representation (`-1` or a non-negative integer).
    pub fn from_raw(value: i64) -> DomainResult<Self> {
        match value {
            UNLIMITED_SENTINEL => Ok(Limit::Unlimited),
            n if n >= 0 => Ok(Limit::Bounded(n as u64)),
            n => Err(DomainError::validation(format!(
                "Invalid limit value {}: use -1 for unlimited or a non-negative number",
                n
            ))),
        }
    }

    /// Wire representation (`-1` for unlimited).
    pub fn as_raw(&self) -> i64 {
        match self {
            Limit::Unlimited => UNLIMITED_SENTINEL,
            Limit::Bounded(n) => *n as i64,
        }
    }

    /// Whether one more resource may be created when `current` already exist.
    pub fn admits_one_more(&self, current: u64) -> bool {
        match self {
            Limit::Unlimited => true,
            Limit::Bounded(max) => current < *max,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => write!(f, "unlimited"),
            Limit::Bounded(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Limit::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

/// Every limit the platform knows how to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKey {
    MaxProducts,
    MaxUsers,
    MaxTables,
    MaxStorageMb,
}

impl LimitKey {
    pub const ALL: [LimitKey; 4] = [
        LimitKey::MaxProducts,
        LimitKey::MaxUsers,
        LimitKey::MaxTables,
        LimitKey::MaxStorageMb,
    ];

    /// Key used in the plan features JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKey::MaxProducts => "maxProducts",
            LimitKey::MaxUsers => "maxUsers",
            LimitKey::MaxTables => "maxTables",
            LimitKey::MaxStorageMb => "maxStorageMB",
        }
    }

    fn resource(&self) -> (&'static str, &'static str) {
        match self {
            LimitKey::MaxProducts => ("Product", "products"),
            LimitKey::MaxUsers => ("User", "users"),
            LimitKey::MaxTables => ("Table", "tables"),
            LimitKey::MaxStorageMb => ("Storage", "MB of storage"),
        }
    }
}

impl fmt::Display for LimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sparse set of limits. Used both for plan defaults and tenant overrides;
/// `None` means the key is not specified at this level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_products: Option<Limit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<Limit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tables: Option<Limit>,
    #[serde(default, rename = "maxStorageMB", skip_serializing_if = "Option::is_none")]
    pub max_storage_mb: Option<Limit>,
}

impl LimitSet {
    pub fn get(&self, key: LimitKey) -> Option<Limit> {
        match key {
            LimitKey::MaxProducts => self.max_products,
            LimitKey::MaxUsers => self.max_users,
            LimitKey::MaxTables => self.max_tables,
            LimitKey::MaxStorageMb => self.max_storage_mb,
        }
    }

    pub fn set(&mut self, key: LimitKey, value: Option<Limit>) {
        match key {
            LimitKey::MaxProducts => self.max_products = value,
            LimitKey::MaxUsers => self.max_users = value,
            LimitKey::MaxTables => self.max_tables = value,
            LimitKey::MaxStorageMb => self.max_storage_mb = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        LimitKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Parse a stored overrides blob. Unknown keys are ignored.
    pub fn from_json(value: &serde_json::Value) -> DomainResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| DomainError::validation(format!("Invalid limits: {}", e)))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Typed view of a plan's `features` blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_products: Option<Limit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<Limit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tables: Option<Limit>,
    #[serde(default, rename = "maxStorageMB", skip_serializing_if = "Option::is_none")]
    pub max_storage_mb: Option<Limit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_duration_days: Option<u32>,
}

impl PlanFeatures {
    pub fn from_json(value: &serde_json::Value) -> DomainResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| DomainError::validation(format!("Invalid plan features: {}", e)))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn limits(&self) -> LimitSet {
        LimitSet {
            max_products: self.max_products,
            max_users: self.max_users,
            max_tables: self.max_tables,
            max_storage_mb: self.max_storage_mb,
        }
    }
}

/// Limits in force for one tenant after applying its overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveLimits {
    #[serde(flatten)]
    limits: LimitSet,
}

impl EffectiveLimits {
    /// The effective limit for `key`, or a configuration error if neither the
    /// plan nor the override defines it.
    pub fn require(&self, key: LimitKey) -> DomainResult<Limit> {
        self.limits
            .get(key)
            .ok_or(DomainError::MissingLimit(key.as_str()))
    }

    pub fn get(&self, key: LimitKey) -> Option<Limit> {
        self.limits.get(key)
    }
}

/// Merge plan defaults with tenant overrides. An override wins for every key
/// it specifies; other keys fall back to the plan.
pub fn resolve_limits(plan: &LimitSet, overrides: Option<&LimitSet>) -> EffectiveLimits {
    let mut merged = plan.clone();
    if let Some(overrides) = overrides {
        for key in LimitKey::ALL {
            if let Some(value) = overrides.get(key) {
                merged.set(key, Some(value));
            }
        }
    }
    EffectiveLimits { limits: merged }
}

/// Decide whether one more resource governed by `key` may be created.
pub fn check_capacity(
    limits: &EffectiveLimits,
    key: LimitKey,
    current: u64,
    plan_display_name: &str,
) -> DomainResult<()> {
    let limit = limits.require(key)?;
    if limit.admits_one_more(current) {
        return Ok(());
    }

    let (resource, plural) = key.resource();
    Err(DomainError::CapacityExceeded {
        resource,
        plural,
        plan: plan_display_name.to_string(),
        limit: limit.as_raw() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn basic_plan() -> LimitSet {
        PlanFeatures::from_json(&json!({
            "maxProducts": 100,
            "maxUsers": 2,
            "maxTables": 10,
            "maxStorageMB": 100
        }))
        .unwrap()
        .limits()
    }

    #[test]
    fn test_sentinel_parses_to_unlimited() {
        assert_eq!(Limit::from_raw(-1).unwrap(), Limit::Unlimited);
        assert_eq!(Limit::from_raw(0).unwrap(), Limit::Bounded(0));
        assert!(Limit::from_raw(-5).is_err());
    }

    #[test]
    fn test_limit_serializes_back_to_sentinel() {
        let features = PlanFeatures::from_json(&json!({ "maxProducts": -1, "maxUsers": 3 })).unwrap();
        let value = features.to_json();
        assert_eq!(value["maxProducts"], json!(-1));
        assert_eq!(value["maxUsers"], json!(3));
        assert!(value.get("maxTables").is_none());
    }

    #[test]
    fn test_unknown_feature_keys_are_ignored() {
        let features =
            PlanFeatures::from_json(&json!({ "maxProducts": 5, "customDomain": true })).unwrap();
        assert_eq!(features.max_products, Some(Limit::Bounded(5)));
    }

    #[test]
    fn test_override_wins_over_plan() {
        let overrides = LimitSet {
            max_products: Some(Limit::Bounded(500)),
            ..Default::default()
        };
        let limits = resolve_limits(&basic_plan(), Some(&overrides));
        assert_eq!(limits.require(LimitKey::MaxProducts).unwrap(), Limit::Bounded(500));
        assert_eq!(limits.require(LimitKey::MaxUsers).unwrap(), Limit::Bounded(2));
    }

    #[test]
    fn test_override_can_lift_to_unlimited() {
        let overrides = LimitSet {
            max_tables: Some(Limit::Unlimited),
            ..Default::default()
        };
        let limits = resolve_limits(&basic_plan(), Some(&overrides));
        assert!(check_capacity(&limits, LimitKey::MaxTables, 1_000_000, "Basic Plan").is_ok());
    }

    #[test]
    fn test_missing_key_fails_closed() {
        let plan = LimitSet {
            max_products: Some(Limit::Bounded(10)),
            ..Default::default()
        };
        let limits = resolve_limits(&plan, None);
        let err = check_capacity(&limits, LimitKey::MaxTables, 0, "Odd Plan").unwrap_err();
        assert_eq!(err, DomainError::MissingLimit("maxTables"));
    }

    #[test]
    fn test_capacity_boundary() {
        let limits = resolve_limits(&basic_plan(), None);
        assert!(check_capacity(&limits, LimitKey::MaxProducts, 99, "Basic Plan").is_ok());

        let err = check_capacity(&limits, LimitKey::MaxProducts, 100, "Basic Plan").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Product limit reached. Your Basic Plan allows 100 products. Please upgrade your plan."
        );
    }

    #[test]
    fn test_zero_limit_blocks_first_creation() {
        let overrides = LimitSet {
            max_users: Some(Limit::Bounded(0)),
            ..Default::default()
        };
        let limits = resolve_limits(&basic_plan(), Some(&overrides));
        assert!(matches!(
            check_capacity(&limits, LimitKey::MaxUsers, 0, "Basic Plan"),
            Err(DomainError::CapacityExceeded { limit: 0, .. })
        ));
    }

    #[test]
    fn test_empty_override_blob() {
        let overrides = LimitSet::from_json(&json!({})).unwrap();
        assert!(overrides.is_empty());
        assert_eq!(resolve_limits(&basic_plan(), Some(&overrides)), resolve_limits(&basic_plan(), None));
    }
}
