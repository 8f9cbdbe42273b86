// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Allow/deny decisions for plan-gated features.
//!
//! All functions are total and side-effect free. Usage counters (subjects
//! saved, AI generations today) are owned by the caller.

use super::limits::{limits_for, Limit};
use crate::error::AppError;
use crate::models::{ChartType, SubscriptionPlan};

pub fn can_access_chart_type(plan: SubscriptionPlan, chart_type: ChartType) -> bool {
    limits_for(plan).allowed_chart_types.contains(chart_type)
}

pub fn can_create_subject(plan: SubscriptionPlan, current_count: u32) -> bool {
    limits_for(plan).max_subjects.allows(current_count)
}

pub fn can_generate_ai(plan: SubscriptionPlan, generations_today: u32) -> bool {
    Limit::Finite(limits_for(plan).max_ai_generations_per_day).allows(generations_today)
}

pub fn remaining_subjects(plan: SubscriptionPlan, current_count: u32) -> Limit {
    limits_for(plan).max_subjects.remaining(current_count)
}

pub fn remaining_ai_generations(plan: SubscriptionPlan, generations_today: u32) -> u32 {
    limits_for(plan)
        .max_ai_generations_per_day
        .saturating_sub(generations_today)
}

/// Route-level guard: `PlanRequired` when the plan cannot open `chart_type`.
pub fn require_chart_type(plan: SubscriptionPlan, chart_type: ChartType) -> Result<(), AppError> {
    if can_access_chart_type(plan, chart_type) {
        Ok(())
    } else {
        Err(AppError::PlanRequired(format!(
            "{chart_type} charts are not available on the {plan} plan"
        )))
    }
}
