// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! AutoLaunch orchestrator core.
//!
//! Turns a logical application record into packaged, target-specific output
//! and drives it through a multi-backend deployment pipeline with approval
//! gating, state tracking, and failure isolation.
//!
//! # Architecture
//!
//! - **domain**: aggregates, value objects, and the trait seams
//!   (`ArtifactStore`, `DeployBackend`, `DeploymentRepository`, `Notifier`)
//! - **application**: the orchestrator (`AutoLaunchService`) and the
//!   artifact preparer
//! - **infrastructure**: concrete adapters: filesystem store, deployment
//!   backends, record repositories, webhook notifier

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
