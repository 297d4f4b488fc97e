// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory deployment record repository for development and testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::application::ApplicationId;
use crate::domain::deployment::{DeploymentId, DeploymentRecord};
use crate::domain::repository::{DeploymentRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryDeploymentRepository {
    records: RwLock<HashMap<DeploymentId, DeploymentRecord>>,
}

impl InMemoryDeploymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DeploymentRepository for InMemoryDeploymentRepository {
    async fn create(&self, record: &DeploymentRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().unwrap();
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn finish(&self, record: &DeploymentRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().unwrap();
        let stored = records
            .get_mut(&record.id)
            .ok_or_else(|| RepositoryError::NotFound(record.id.to_string()))?;

        // Idempotent terminal update: once terminal, later retries are no-ops.
        if stored.status.is_terminal() {
            return Ok(());
        }
        *stored = record.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: DeploymentId,
    ) -> Result<Option<DeploymentRecord>, RepositoryError> {
        Ok(self.records.read().unwrap().get(&id).cloned())
    }

    async fn find_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<DeploymentRecord>, RepositoryError> {
        let records = self.records.read().unwrap();
        let mut matching: Vec<DeploymentRecord> = records
            .values()
            .filter(|r| r.application_id == application_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{Application, ArtifactKind};
    use crate::domain::deployment::{DeploymentStatus, Environment};
    use std::collections::BTreeMap;

    fn app() -> Application {
        Application {
            id: ApplicationId::new(),
            kind: ArtifactKind::Website,
            name: "Demo".to_string(),
            slug: "demo".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            author: None,
            approved: false,
            preview_url: None,
            files: BTreeMap::new(),
            wordpress: None,
            extension: None,
            mobile: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryDeploymentRepository::new();
        let record = DeploymentRecord::new(&app(), Environment::Staging, "docker");
        repo.create(&record).await.unwrap();

        let found = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.status, DeploymentStatus::InProgress);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_finish_is_idempotent() {
        let repo = InMemoryDeploymentRepository::new();
        let mut record = DeploymentRecord::new(&app(), Environment::Staging, "docker");
        repo.create(&record).await.unwrap();

        record.complete(Some("http://localhost:9000".to_string()), "ok");
        repo.finish(&record).await.unwrap();
        let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
        let first_end = stored.ended_at.unwrap();

        // Retrying the terminal update with a divergent payload changes nothing.
        let mut retry = record.clone();
        retry.logs = "retried".to_string();
        repo.finish(&retry).await.unwrap();

        let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.ended_at, Some(first_end));
        assert_eq!(stored.logs, "ok");
        assert_eq!(stored.status, DeploymentStatus::Deployed);
    }

    #[tokio::test]
    async fn test_finish_unknown_record_fails() {
        let repo = InMemoryDeploymentRepository::new();
        let mut record = DeploymentRecord::new(&app(), Environment::Staging, "docker");
        record.fail("boom");
        let err = repo.finish(&record).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first() {
        let repo = InMemoryDeploymentRepository::new();
        let application = app();

        let older = DeploymentRecord::new(&application, Environment::Staging, "docker");
        repo.create(&older).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = DeploymentRecord::new(&application, Environment::Production, "docker");
        repo.create(&newer).await.unwrap();

        let history = repo.find_by_application(application.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, newer.id);
    }
}
