// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod subscription;

pub use subscription::{
    Resolution, ResolutionSource, SessionWithSubscription, SubscriptionResolver,
};
