// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the AutoLaunch CLI

pub mod config;
pub mod launch;

pub use self::config::ConfigCommand;
pub use self::launch::LaunchArgs;
