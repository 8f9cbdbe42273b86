// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tokens and their cookie storage.

pub mod codec;
pub mod store;

pub use codec::{AdminRole, AdminSessionPayload, SessionPayload, TokenCodec};
pub use store::{AdminSessionStore, SessionClaims, SessionStore, UserSessionStore};
