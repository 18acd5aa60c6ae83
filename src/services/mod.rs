// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Ownership, visibility, and multi-manager orchestration shared by all routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Route handlers stay thin: they parse requests and call into these
//! functions, which combine database managers with the pure algorithms in
//! `nutrilog_intelligence`.

/// Diary entries, day summaries, and intake history
pub mod diary;

/// Food access rules and USDA import
pub mod foods;

/// Portion ownership rules
pub mod portions;

/// Recipe ownership, visibility, and ingredients
pub mod recipes;

/// Friend requests and user discovery
pub mod social;

/// Exercise logging, projections, and suggested goals
pub mod tracking;
