// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription plan and status read model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier.
///
/// Deserialization is lenient: anything that is not a known plan name
/// becomes `Free`, never a more permissive plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SubscriptionPlan {
    Free,
    Trial,
    Pro,
    Lifetime,
}

impl SubscriptionPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Trial => "trial",
            SubscriptionPlan::Pro => "pro",
            SubscriptionPlan::Lifetime => "lifetime",
        }
    }

    /// Parse a plan name, falling back to `Free` for unknown or empty input.
    pub fn parse_or_free(value: &str) -> Self {
        value.parse().unwrap_or(SubscriptionPlan::Free)
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionPlan::Free),
            "trial" => Ok(SubscriptionPlan::Trial),
            "pro" => Ok(SubscriptionPlan::Pro),
            "lifetime" => Ok(SubscriptionPlan::Lifetime),
            other => Err(format!("unknown subscription plan: {other}")),
        }
    }
}

impl From<String> for SubscriptionPlan {
    fn from(value: String) -> Self {
        SubscriptionPlan::parse_or_free(&value)
    }
}

/// Chart kinds that can be gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Natal,
    Transits,
    Synastry,
    Composite,
    Progressions,
    SolarReturn,
    LunarReturn,
    Timeline,
}

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Natal,
        ChartType::Transits,
        ChartType::Synastry,
        ChartType::Composite,
        ChartType::Progressions,
        ChartType::SolarReturn,
        ChartType::LunarReturn,
        ChartType::Timeline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Natal => "natal",
            ChartType::Transits => "transits",
            ChartType::Synastry => "synastry",
            ChartType::Composite => "composite",
            ChartType::Progressions => "progressions",
            ChartType::SolarReturn => "solar_return",
            ChartType::LunarReturn => "lunar_return",
            ChartType::Timeline => "timeline",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ChartType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == normalized)
            .ok_or_else(|| format!("unknown chart type: {s}"))
    }
}

/// Effective subscription state for one user.
///
/// Recomputed per request (or per forced sync); never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub plan: SubscriptionPlan,
    pub is_active: bool,
    pub trial_days_left: Option<i64>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
}

impl SubscriptionStatus {
    /// Universal unlock, used when billing is switched off or absent.
    pub fn lifetime_unlocked() -> Self {
        Self {
            plan: SubscriptionPlan::Lifetime,
            is_active: true,
            trial_days_left: None,
            subscription_ends_at: None,
            is_stale: false,
        }
    }

    /// Most restrictive status, used when the provider cannot be trusted.
    ///
    /// Marked stale so callers know a forced sync may change it.
    pub fn free_fallback() -> Self {
        Self {
            plan: SubscriptionPlan::Free,
            is_active: false,
            trial_days_left: None,
            subscription_ends_at: None,
            is_stale: true,
        }
    }
}
