// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Record Repository Interface
//!
//! Persistence contract for the `DeploymentRecord` aggregate, following the
//! repository pattern: interface in the domain layer, implementations in
//! `crate::infrastructure::repositories`. In-memory storage is used for
//! development and testing; PostgreSQL for production.
//!
//! Both operations are idempotent-safe against retries of the terminal
//! update: finishing an already-terminal record is a no-op, not an error -
//! the stored end time survives.

use async_trait::async_trait;

use crate::domain::application::ApplicationId;
use crate::domain::deployment::{DeploymentId, DeploymentRecord};

/// Storage backend selected at startup from configuration.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    Postgres(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
}

#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Persist a freshly created record (status `in_progress`).
    async fn create(&self, record: &DeploymentRecord) -> Result<(), RepositoryError>;

    /// Apply the terminal update. No-op when the stored record is already
    /// terminal.
    async fn finish(&self, record: &DeploymentRecord) -> Result<(), RepositoryError>;

    /// Find a record by ID.
    async fn find_by_id(&self, id: DeploymentId) -> Result<Option<DeploymentRecord>, RepositoryError>;

    /// Deployment history for one application, most recent first.
    async fn find_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<DeploymentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
