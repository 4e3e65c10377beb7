// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google;
pub mod handle;
pub mod token;

pub use google::{GoogleAuthClient, GoogleClaims};
pub use handle::generate_channel_handle;
pub use token::{TokenError, TokenIssuer};
