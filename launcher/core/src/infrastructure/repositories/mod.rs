// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Record Repositories
//!
//! Concrete implementations of `DeploymentRepository`, selected at startup
//! from `StorageBackend`: in-memory for development and testing, PostgreSQL
//! for production.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDeploymentRepository;
pub use postgres::PostgresDeploymentRepository;
