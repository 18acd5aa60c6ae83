// ABOUTME: Core types and constants for the NutriLog nutrition tracker
// ABOUTME: Foundation crate with error handling, constants, and shared domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `NutriLog` Core
//!
//! Foundation crate providing shared types and constants for the `NutriLog`
//! server and its algorithm crate. It changes rarely, so the rest of the
//! workspace benefits from incremental compilation.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Nutrients, diary references, body profile, and social enums

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Shared domain models
pub mod models;
