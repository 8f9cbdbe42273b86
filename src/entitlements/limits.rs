// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static plan limit table.
//!
//! | Plan | Subjects | Chart types | AI generations/day |
//! |------|----------|-------------|--------------------|
//! | free | 5 | natal | 5 |
//! | trial, pro, lifetime | unlimited | all | 100 |

use crate::models::{ChartType, SubscriptionPlan};
use serde::{Serialize, Serializer};

pub const FREE_MAX_SUBJECTS: u32 = 5;
pub const FREE_AI_GENERATIONS_PER_DAY: u32 = 5;
pub const PAID_AI_GENERATIONS_PER_DAY: u32 = 100;

const FREE_CHART_TYPES: &[ChartType] = &[ChartType::Natal];

/// A quota that may be unbounded. Serializes as a number, or `null` for unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Finite(u32),
    Unlimited,
}

impl Limit {
    /// True while `used` is strictly below the limit.
    pub fn allows(self, used: u32) -> bool {
        match self {
            Limit::Finite(max) => used < max,
            Limit::Unlimited => true,
        }
    }

    /// Quota left after `used`, saturating at zero.
    pub fn remaining(self, used: u32) -> Limit {
        match self {
            Limit::Finite(max) => Limit::Finite(max.saturating_sub(used)),
            Limit::Unlimited => Limit::Unlimited,
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Finite(n) => serializer.serialize_u32(*n),
            Limit::Unlimited => serializer.serialize_none(),
        }
    }
}

/// Which chart types a plan may open. Serializes as `"all"` or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartAccess {
    All,
    Only(&'static [ChartType]),
}

impl ChartAccess {
    pub fn contains(self, chart_type: ChartType) -> bool {
        match self {
            ChartAccess::All => true,
            ChartAccess::Only(types) => types.contains(&chart_type),
        }
    }
}

impl Serialize for ChartAccess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChartAccess::All => serializer.serialize_str("all"),
            ChartAccess::Only(types) => types.serialize(serializer),
        }
    }
}

/// Resource limits attached to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_subjects: Limit,
    pub allowed_chart_types: ChartAccess,
    #[serde(rename = "maxAIGenerationsPerDay")]
    pub max_ai_generations_per_day: u32,
}

/// Look up the limits for a plan. Total: every plan has exactly one row.
pub fn limits_for(plan: SubscriptionPlan) -> PlanLimits {
    match plan {
        SubscriptionPlan::Free => PlanLimits {
            max_subjects: Limit::Finite(FREE_MAX_SUBJECTS),
            allowed_chart_types: ChartAccess::Only(FREE_CHART_TYPES),
            max_ai_generations_per_day: FREE_AI_GENERATIONS_PER_DAY,
        },
        SubscriptionPlan::Trial | SubscriptionPlan::Pro | SubscriptionPlan::Lifetime => {
            PlanLimits {
                max_subjects: Limit::Unlimited,
                allowed_chart_types: ChartAccess::All,
                max_ai_generations_per_day: PAID_AI_GENERATIONS_PER_DAY,
            }
        }
    }
}

/// Look up limits for a raw plan name; unknown names get the `free` row.
pub fn limits_for_name(plan: &str) -> PlanLimits {
    limits_for(SubscriptionPlan::parse_or_free(plan))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANS: [SubscriptionPlan; 4] = [
        SubscriptionPlan::Free,
        SubscriptionPlan::Trial,
        SubscriptionPlan::Pro,
        SubscriptionPlan::Lifetime,
    ];

    #[test]
    fn test_lookup_is_deterministic() {
        for plan in PLANS {
            assert_eq!(limits_for(plan), limits_for(plan));
        }
    }

    #[test]
    fn test_only_free_restricts_chart_types() {
        for plan in PLANS {
            let restricted = matches!(limits_for(plan).allowed_chart_types, ChartAccess::Only(_));
            assert_eq!(restricted, plan == SubscriptionPlan::Free, "{plan}");
        }
    }

    #[test]
    fn test_paid_plans_share_limits() {
        let pro = limits_for(SubscriptionPlan::Pro);
        assert_eq!(limits_for(SubscriptionPlan::Trial), pro);
        assert_eq!(limits_for(SubscriptionPlan::Lifetime), pro);
    }

    #[test]
    fn test_unknown_name_gets_free_row() {
        assert_eq!(limits_for_name("gold"), limits_for(SubscriptionPlan::Free));
        assert_eq!(limits_for_name(""), limits_for(SubscriptionPlan::Free));
        assert_eq!(limits_for_name("pro"), limits_for(SubscriptionPlan::Pro));
    }

    #[test]
    fn test_limit_arithmetic() {
        assert!(Limit::Finite(5).allows(4));
        assert!(!Limit::Finite(5).allows(5));
        assert!(Limit::Unlimited.allows(u32::MAX));
        assert_eq!(Limit::Finite(5).remaining(7), Limit::Finite(0));
        assert_eq!(Limit::Unlimited.remaining(7), Limit::Unlimited);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(limits_for(SubscriptionPlan::Free)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "maxSubjects": 5,
                "allowedChartTypes": ["natal"],
                "maxAIGenerationsPerDay": 5
            })
        );

        let json = serde_json::to_value(limits_for(SubscriptionPlan::Pro)).unwrap();
        assert_eq!(json["maxSubjects"], serde_json::Value::Null);
        assert_eq!(json["allowedChartTypes"], "all");
    }
}
