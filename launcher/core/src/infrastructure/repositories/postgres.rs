// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! PostgreSQL deployment record repository.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE deployments (
//!     id              UUID PRIMARY KEY,
//!     application_id  UUID NOT NULL,
//!     kind            TEXT NOT NULL,
//!     environment     TEXT NOT NULL,
//!     method          TEXT NOT NULL,
//!     status          TEXT NOT NULL,
//!     started_at      TIMESTAMPTZ NOT NULL,
//!     ended_at        TIMESTAMPTZ,
//!     deployed_url    TEXT,
//!     logs            TEXT NOT NULL DEFAULT ''
//! );
//! CREATE INDEX deployments_application_idx ON deployments (application_id, started_at DESC);
//! ```
//!
//! The terminal update is guarded by `status = 'in_progress'`, which makes a
//! retried update match zero rows: idempotence without read-modify-write.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::application::{ApplicationId, ArtifactKind};
use crate::domain::deployment::{
    DeploymentId, DeploymentRecord, DeploymentStatus, Environment,
};
use crate::domain::repository::{DeploymentRepository, RepositoryError};

pub struct PostgresDeploymentRepository {
    pool: PgPool,
}

impl PostgresDeploymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(connection_string: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(connection_string).await?;
        Ok(Self::new(pool))
    }
}

fn kind_from_str(s: &str) -> Result<ArtifactKind, RepositoryError> {
    match s {
        "website" => Ok(ArtifactKind::Website),
        "wordpress-theme" => Ok(ArtifactKind::WordpressTheme),
        "wordpress-plugin" => Ok(ArtifactKind::WordpressPlugin),
        "browser-extension" => Ok(ArtifactKind::BrowserExtension),
        "mobile-app" => Ok(ArtifactKind::MobileApp),
        other => Err(RepositoryError::Serialization(format!(
            "unknown artifact kind '{}'",
            other
        ))),
    }
}

fn environment_from_str(s: &str) -> Result<Environment, RepositoryError> {
    s.parse::<Environment>().map_err(RepositoryError::Serialization)
}

fn status_from_str(s: &str) -> Result<DeploymentStatus, RepositoryError> {
    match s {
        "in_progress" => Ok(DeploymentStatus::InProgress),
        "deployed" => Ok(DeploymentStatus::Deployed),
        "failed" => Ok(DeploymentStatus::Failed),
        other => Err(RepositoryError::Serialization(format!(
            "unknown deployment status '{}'",
            other
        ))),
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<DeploymentRecord, RepositoryError> {
    let id: Uuid = row.get("id");
    let application_id: Uuid = row.get("application_id");
    let kind: String = row.get("kind");
    let environment: String = row.get("environment");
    let status: String = row.get("status");

    Ok(DeploymentRecord {
        id: DeploymentId(id),
        application_id: ApplicationId(application_id),
        kind: kind_from_str(&kind)?,
        environment: environment_from_str(&environment)?,
        method: row.get("method"),
        status: status_from_str(&status)?,
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
        deployed_url: row.get("deployed_url"),
        logs: row.get("logs"),
    })
}

#[async_trait]
impl DeploymentRepository for PostgresDeploymentRepository {
    async fn create(&self, record: &DeploymentRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO deployments (
                id, application_id, kind, environment, method,
                status, started_at, ended_at, deployed_url, logs
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.0)
        .bind(record.application_id.0)
        .bind(record.kind.as_str())
        .bind(record.environment.as_str())
        .bind(&record.method)
        .bind(record.status.as_str())
        .bind(record.started_at)
        .bind(record.ended_at)
        .bind(&record.deployed_url)
        .bind(&record.logs)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to create deployment: {}", e)))?;

        Ok(())
    }

    async fn finish(&self, record: &DeploymentRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE deployments
            SET status = $2, ended_at = $3, deployed_url = $4, logs = $5
            WHERE id = $1 AND status = 'in_progress'
            "#,
        )
        .bind(record.id.0)
        .bind(record.status.as_str())
        .bind(record.ended_at)
        .bind(&record.deployed_url)
        .bind(&record.logs)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to finish deployment: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: DeploymentId,
    ) -> Result<Option<DeploymentRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, application_id, kind, environment, method,
                   status, started_at, ended_at, deployed_url, logs
            FROM deployments
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<DeploymentRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, application_id, kind, environment, method,
                   status, started_at, ended_at, deployed_url, logs
            FROM deployments
            WHERE application_id = $1
            ORDER BY started_at DESC
            "#,
        )
        .bind(application_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }
}
