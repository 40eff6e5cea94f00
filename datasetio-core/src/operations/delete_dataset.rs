use crate::error::Result;
use crate::storage::{DatasetRecord, FileStore, MetadataStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct DeleteDatasetOperation {
    metadata: Arc<MetadataStore>,
    files: Arc<FileStore>,
}

#[derive(Debug, Clone)]
pub struct DeleteDatasetOperationRequest {
    pub owner: String,
    pub project: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum DeleteDatasetOperationOutcome {
    Deleted(DatasetRecord),
    NotFound,
}

impl DeleteDatasetOperation {
    pub fn new(metadata: Arc<MetadataStore>, files: Arc<FileStore>) -> Self {
        Self { metadata, files }
    }

    pub async fn run(
        &self,
        request: DeleteDatasetOperationRequest,
    ) -> Result<DeleteDatasetOperationOutcome> {
        let DeleteDatasetOperationRequest {
            owner,
            project,
            name,
        } = request;

        self.metadata.ping()?;

        // Record first: when nothing matched, no file operation happens.
        let Some(removed) = self.metadata.delete_dataset(&owner, &project, &name)? else {
            return Ok(DeleteDatasetOperationOutcome::NotFound);
        };

        // The record is already gone; a failed removal orphans the file and
        // is surfaced to the caller as-is.
        self.files.remove(&owner, &project, &name).await?;

        Ok(DeleteDatasetOperationOutcome::Deleted(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::create_dataset::{
        CreateDatasetOperation, CreateDatasetOperationRequest,
    };
    use crate::storage::ProjectRecord;
    use bytes::Bytes;
    use chrono::Utc;

    fn test_stores() -> (tempfile::TempDir, Arc<MetadataStore>, Arc<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let metadata = Arc::new(MetadataStore::open(dir.path().join("metadata.db")).unwrap());
        let files = Arc::new(FileStore::new(dir.path().join("files")).unwrap());
        (dir, metadata, files)
    }

    async fn seed(metadata: &Arc<MetadataStore>, files: &Arc<FileStore>) {
        metadata
            .insert_project(&ProjectRecord {
                owner: "a@x.com".to_string(),
                name: "p1".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();

        let create = CreateDatasetOperation::new(metadata.clone(), files.clone());
        create
            .run(CreateDatasetOperationRequest {
                owner: "a@x.com".to_string(),
                project: "p1".to_string(),
                name: "d.csv".to_string(),
                content_type: "text/csv".to_string(),
                body: Bytes::from_static(b"x,y\n"),
            })
            .await
            .unwrap();
    }

    fn delete_request() -> DeleteDatasetOperationRequest {
        DeleteDatasetOperationRequest {
            owner: "a@x.com".to_string(),
            project: "p1".to_string(),
            name: "d.csv".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_file() {
        let (_dir, metadata, files) = test_stores();
        seed(&metadata, &files).await;

        let delete = DeleteDatasetOperation::new(metadata.clone(), files.clone());
        let outcome = delete.run(delete_request()).await.unwrap();

        assert!(matches!(outcome, DeleteDatasetOperationOutcome::Deleted(_)));
        assert!(metadata.find_dataset("a@x.com", "p1", "d.csv").unwrap().is_none());
        assert!(!files.exists("a@x.com", "p1", "d.csv"));
    }

    #[tokio::test]
    async fn test_delete_missing_dataset_is_not_found() {
        let (_dir, metadata, files) = test_stores();

        let delete = DeleteDatasetOperation::new(metadata, files);
        let outcome = delete.run(delete_request()).await.unwrap();
        assert!(matches!(outcome, DeleteDatasetOperationOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_failed_file_removal_still_drops_the_record() {
        let (_dir, metadata, files) = test_stores();
        seed(&metadata, &files).await;

        files.remove("a@x.com", "p1", "d.csv").await.unwrap();

        let delete = DeleteDatasetOperation::new(metadata.clone(), files);
        assert!(delete.run(delete_request()).await.is_err());
        assert!(metadata.find_dataset("a@x.com", "p1", "d.csv").unwrap().is_none());
    }
}
