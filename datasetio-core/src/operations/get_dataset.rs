use crate::error::{DatasetError, Result};
use crate::storage::{DatasetRecord, FileStore, MetadataStore, compute_hash};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct GetDatasetOperation {
    metadata: Arc<MetadataStore>,
    files: Arc<FileStore>,
}

#[derive(Debug, Clone)]
pub struct GetDatasetOperationRequest {
    pub owner: String,
    pub project: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct GetDatasetOperationResult {
    pub record: DatasetRecord,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub enum GetDatasetOperationOutcome {
    Found(GetDatasetOperationResult),
    NotFound,
}

impl GetDatasetOperation {
    pub fn new(metadata: Arc<MetadataStore>, files: Arc<FileStore>) -> Self {
        Self { metadata, files }
    }

    pub async fn run(
        &self,
        request: GetDatasetOperationRequest,
    ) -> Result<GetDatasetOperationOutcome> {
        let GetDatasetOperationRequest {
            owner,
            project,
            name,
        } = request;

        self.metadata.ping()?;

        let Some(record) = self.metadata.find_dataset(&owner, &project, &name)? else {
            return Ok(GetDatasetOperationOutcome::NotFound);
        };

        // The record is the existence check; a missing or diverged file past
        // this point is an internal inconsistency, not a NotFound.
        let body = self.files.read(&owner, &project, &name).await?;

        let actual = compute_hash(&body);
        if actual != record.sha256 {
            return Err(DatasetError::Inconsistent(format!(
                "content digest mismatch for {}: expected {}, got {}",
                record.content_path, record.sha256, actual
            )));
        }

        Ok(GetDatasetOperationOutcome::Found(
            GetDatasetOperationResult { record, body },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::create_dataset::{
        CreateDatasetOperation, CreateDatasetOperationRequest,
    };
    use crate::storage::ProjectRecord;
    use chrono::Utc;

    fn test_stores() -> (tempfile::TempDir, Arc<MetadataStore>, Arc<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let metadata = Arc::new(MetadataStore::open(dir.path().join("metadata.db")).unwrap());
        let files = Arc::new(FileStore::new(dir.path().join("files")).unwrap());
        (dir, metadata, files)
    }

    async fn seed_dataset(metadata: &Arc<MetadataStore>, files: &Arc<FileStore>, body: &str) {
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
                body: Bytes::from(body.to_string()),
            })
            .await
            .unwrap();
    }

    fn get_request() -> GetDatasetOperationRequest {
        GetDatasetOperationRequest {
            owner: "a@x.com".to_string(),
            project: "p1".to_string(),
            name: "d.csv".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (_dir, metadata, files) = test_stores();

        let get = GetDatasetOperation::new(metadata, files);
        let outcome = get.run(get_request()).await.unwrap();
        assert!(matches!(outcome, GetDatasetOperationOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_missing_file_under_record_is_inconsistent() {
        let (_dir, metadata, files) = test_stores();
        seed_dataset(&metadata, &files, "x,y\n").await;

        files.remove("a@x.com", "p1", "d.csv").await.unwrap();

        let get = GetDatasetOperation::new(metadata, files);
        let error = get.run(get_request()).await.unwrap_err();
        assert!(matches!(error, DatasetError::Inconsistent(_)));
    }

    #[tokio::test]
    async fn test_diverged_file_content_is_inconsistent() {
        let (_dir, metadata, files) = test_stores();
        seed_dataset(&metadata, &files, "x,y\n").await;

        let path = files.dataset_path("a@x.com", "p1", "d.csv").unwrap();
        std::fs::write(path, b"tampered").unwrap();

        let get = GetDatasetOperation::new(metadata, files);
        let error = get.run(get_request()).await.unwrap_err();
        assert!(matches!(error, DatasetError::Inconsistent(_)));
    }
}
