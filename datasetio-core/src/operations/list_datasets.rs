use crate::error::Result;
use crate::storage::{DatasetRecord, MetadataStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct ListDatasetsOperation {
    metadata: Arc<MetadataStore>,
}

#[derive(Debug, Clone)]
pub struct ListDatasetsOperationRequest {
    pub owner: String,
    pub project: String,
}

#[derive(Debug, Clone)]
pub enum ListDatasetsOperationOutcome {
    Listed(Vec<DatasetRecord>),
    ProjectNotFound,
}

impl ListDatasetsOperation {
    pub fn new(metadata: Arc<MetadataStore>) -> Self {
        Self { metadata }
    }

    pub async fn run(
        &self,
        request: ListDatasetsOperationRequest,
    ) -> Result<ListDatasetsOperationOutcome> {
        let ListDatasetsOperationRequest { owner, project } = request;

        self.metadata.ping()?;

        // Same existence check as create, so "no such project" and "project
        // with no datasets yet" stay distinguishable.
        if self.metadata.find_project(&owner, &project)?.is_none() {
            return Ok(ListDatasetsOperationOutcome::ProjectNotFound);
        }

        let records = self.metadata.list_datasets(&owner, &project)?;
        Ok(ListDatasetsOperationOutcome::Listed(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::create_dataset::{
        CreateDatasetOperation, CreateDatasetOperationRequest,
    };
    use crate::storage::{FileStore, ProjectRecord};
    use bytes::Bytes;
    use chrono::Utc;

    fn test_stores() -> (tempfile::TempDir, Arc<MetadataStore>, Arc<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let metadata = Arc::new(MetadataStore::open(dir.path().join("metadata.db")).unwrap());
        let files = Arc::new(FileStore::new(dir.path().join("files")).unwrap());
        (dir, metadata, files)
    }

    fn register_project(metadata: &MetadataStore, owner: &str, name: &str) {
        metadata
            .insert_project(&ProjectRecord {
                owner: owner.to_string(),
                name: name.to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
    }

    async fn create(
        metadata: &Arc<MetadataStore>,
        files: &Arc<FileStore>,
        owner: &str,
        project: &str,
        name: &str,
    ) {
        let create = CreateDatasetOperation::new(metadata.clone(), files.clone());
        create
            .run(CreateDatasetOperationRequest {
                owner: owner.to_string(),
                project: project.to_string(),
                name: name.to_string(),
                content_type: "text/csv".to_string(),
                body: Bytes::from_static(b"x\n"),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_project_is_distinct_from_empty() {
        let (_dir, metadata, _files) = test_stores();

        let list = ListDatasetsOperation::new(metadata.clone());
        let outcome = list
            .run(ListDatasetsOperationRequest {
                owner: "a@x.com".to_string(),
                project: "p1".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ListDatasetsOperationOutcome::ProjectNotFound
        ));

        register_project(&metadata, "a@x.com", "p1");
        let outcome = list
            .run(ListDatasetsOperationRequest {
                owner: "a@x.com".to_string(),
                project: "p1".to_string(),
            })
            .await
            .unwrap();
        match outcome {
            ListDatasetsOperationOutcome::Listed(records) => assert!(records.is_empty()),
            other => panic!("expected Listed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_owner_and_project() {
        let (_dir, metadata, files) = test_stores();
        register_project(&metadata, "a@x.com", "p1");
        register_project(&metadata, "a@x.com", "p2");
        register_project(&metadata, "b@x.com", "p1");

        create(&metadata, &files, "a@x.com", "p1", "one.csv").await;
        create(&metadata, &files, "a@x.com", "p1", "two.csv").await;
        create(&metadata, &files, "a@x.com", "p2", "other.csv").await;
        create(&metadata, &files, "b@x.com", "p1", "foreign.csv").await;

        let list = ListDatasetsOperation::new(metadata);
        let outcome = list
            .run(ListDatasetsOperationRequest {
                owner: "a@x.com".to_string(),
                project: "p1".to_string(),
            })
            .await
            .unwrap();

        let records = match outcome {
            ListDatasetsOperationOutcome::Listed(records) => records,
            other => panic!("expected Listed, got {:?}", other),
        };

        let names: Vec<&str> = records.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["one.csv", "two.csv"]);
    }
}
