// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the spam detection service
//!
//! This crate provides common types that are shared across multiple crates
//! in the workspace, avoiding circular dependencies between the predictor,
//! the prediction store and the HTTP server.

pub mod spam_label;

pub use spam_label::{SpamLabel, UnknownLabel};
