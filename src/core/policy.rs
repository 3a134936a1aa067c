//! Plan tiers and the entitlements they grant.

use super::badge::BadgePeriod;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy error types.
#[derive(Error, Debug, PartialEq)]
pub enum PolicyError {
    #[error("your {plan} plan allows minimum {min_secs} second intervals")]
    IntervalTooShort { plan: String, min_secs: u32 },
}

/// Everything a plan tier entitles an account to.
///
/// Resolved once per lookup and never mutated; handlers treat it as a
/// read-only record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanPolicy {
    pub tier: String,
    pub max_monitors: i64,
    pub min_check_interval_secs: u32,
    pub retention_days: u32,
    pub badge_periods: Vec<BadgePeriod>,
    pub webhooks_enabled: bool,
    pub custom_domain_enabled: bool,
    pub api_access_enabled: bool,
    pub email_alerts_enabled: bool,
    pub max_alerts_per_day: u32,
}

/// Resolve a tier string to its policy.
///
/// Total over any input: unknown or stale tier strings fall back to the
/// free policy instead of failing, since this feeds display logic and not
/// billing.
pub fn resolve_policy(tier: &str) -> PlanPolicy {
    match tier {
        "pro" => PlanPolicy {
            tier: "pro".to_string(),
            max_monitors: 25,
            min_check_interval_secs: 60,
            retention_days: 30,
            badge_periods: vec![BadgePeriod::H24, BadgePeriod::D7, BadgePeriod::D30],
            webhooks_enabled: true,
            custom_domain_enabled: false,
            api_access_enabled: true,
            email_alerts_enabled: true,
            max_alerts_per_day: 100,
        },
        "business" => PlanPolicy {
            tier: "business".to_string(),
            max_monitors: 100,
            min_check_interval_secs: 30,
            retention_days: 90,
            badge_periods: vec![
                BadgePeriod::H24,
                BadgePeriod::D7,
                BadgePeriod::D30,
                BadgePeriod::D90,
            ],
            webhooks_enabled: true,
            custom_domain_enabled: true,
            api_access_enabled: true,
            email_alerts_enabled: true,
            max_alerts_per_day: 1000,
        },
        _ => PlanPolicy {
            tier: "free".to_string(),
            max_monitors: 1,
            min_check_interval_secs: 300,
            retention_days: 7,
            badge_periods: vec![BadgePeriod::H24, BadgePeriod::D7],
            webhooks_enabled: false,
            custom_domain_enabled: false,
            api_access_enabled: false,
            email_alerts_enabled: true,
            max_alerts_per_day: 5,
        },
    }
}

/// Can this account add one more monitor right now?
///
/// Equality means "at capacity" and blocks; the add-monitor handler is
/// gated on exactly this comparison.
pub fn can_add_monitor(policy: &PlanPolicy, current_count: i64) -> bool {
    current_count < policy.max_monitors
}

/// Validate a requested check interval against the plan minimum.
pub fn validate_check_interval(policy: &PlanPolicy, requested_secs: u32) -> Result<(), PolicyError> {
    if requested_secs < policy.min_check_interval_secs {
        return Err(PolicyError::IntervalTooShort {
            plan: policy.tier.clone(),
            min_secs: policy.min_check_interval_secs,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tiers() {
        let free = resolve_policy("free");
        assert_eq!(free.max_monitors, 1);
        assert_eq!(free.min_check_interval_secs, 300);
        assert_eq!(free.retention_days, 7);
        assert!(!free.webhooks_enabled);

        let pro = resolve_policy("pro");
        assert_eq!(pro.max_monitors, 25);
        assert_eq!(pro.min_check_interval_secs, 60);
        assert_eq!(pro.retention_days, 30);
        assert!(pro.api_access_enabled);
        assert!(!pro.custom_domain_enabled);

        let business = resolve_policy("business");
        assert_eq!(business.max_monitors, 100);
        assert_eq!(business.min_check_interval_secs, 30);
        assert_eq!(business.retention_days, 90);
        assert!(business.custom_domain_enabled);
    }

    #[test]
    fn test_unknown_tier_falls_back_to_free() {
        assert_eq!(resolve_policy("enterprise"), resolve_policy("free"));
        assert_eq!(resolve_policy(""), resolve_policy("free"));
    }

    #[test]
    fn test_badge_periods_are_supersets() {
        let free = resolve_policy("free").badge_periods;
        let pro = resolve_policy("pro").badge_periods;
        let business = resolve_policy("business").badge_periods;

        assert!(free.iter().all(|p| pro.contains(p)));
        assert!(pro.iter().all(|p| business.contains(p)));
        assert_eq!(business.len(), 4);

        // Ordered and deduplicated
        for periods in [&free, &pro, &business] {
            let mut sorted = periods.to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(&sorted, periods);
        }
    }

    #[test]
    fn test_can_add_monitor_boundary() {
        let policy = resolve_policy("pro");
        assert!(can_add_monitor(&policy, 0));
        assert!(can_add_monitor(&policy, policy.max_monitors - 1));
        assert!(!can_add_monitor(&policy, policy.max_monitors));
        assert!(!can_add_monitor(&policy, policy.max_monitors + 1));
    }

    #[test]
    fn test_validate_check_interval() {
        let free = resolve_policy("free");
        assert!(validate_check_interval(&free, 300).is_ok());
        assert!(validate_check_interval(&free, 600).is_ok());

        let err = validate_check_interval(&free, 60).unwrap_err();
        assert_eq!(
            err,
            PolicyError::IntervalTooShort {
                plan: "free".to_string(),
                min_secs: 300
            }
        );
    }
}
