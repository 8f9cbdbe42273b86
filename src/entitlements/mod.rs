// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan limits and the entitlement gate built on them.

pub mod gate;
pub mod limits;

pub use gate::{
    can_access_chart_type, can_create_subject, can_generate_ai, remaining_ai_generations,
    remaining_subjects, require_chart_type,
};
pub use limits::{limits_for, limits_for_name, ChartAccess, Limit, PlanLimits};
