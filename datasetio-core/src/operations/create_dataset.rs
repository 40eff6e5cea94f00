use crate::error::Result;
use crate::storage::{DatasetRecord, FileStore, MetadataStore, compute_hash};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct CreateDatasetOperation {
    metadata: Arc<MetadataStore>,
    files: Arc<FileStore>,
}

#[derive(Debug, Clone)]
pub struct CreateDatasetOperationRequest {
    pub owner: String,
    pub project: String,
    pub name: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub enum CreateDatasetOperationOutcome {
    Created(DatasetRecord),
    InvalidContentType(String),
    ProjectNotFound,
    NameConflict(String),
}

impl CreateDatasetOperation {
    pub fn new(metadata: Arc<MetadataStore>, files: Arc<FileStore>) -> Self {
        Self { metadata, files }
    }

    pub async fn run(
        &self,
        request: CreateDatasetOperationRequest,
    ) -> Result<CreateDatasetOperationOutcome> {
        let CreateDatasetOperationRequest {
            owner,
            project,
            name,
            content_type,
            body,
        } = request;

        self.metadata.ping()?;

        if !is_csv_content_type(&content_type) {
            return Ok(CreateDatasetOperationOutcome::InvalidContentType(
                content_type,
            ));
        }

        let content_path = FileStore::relative_path(&owner, &project, &name)?;

        if self.metadata.find_project(&owner, &project)?.is_none() {
            return Ok(CreateDatasetOperationOutcome::ProjectNotFound);
        }

        if self
            .metadata
            .find_dataset(&owner, &project, &name)?
            .is_some()
        {
            return Ok(CreateDatasetOperationOutcome::NameConflict(name));
        }

        // File first, record second: a failed write aborts with no record.
        self.files.write(&owner, &project, &name, &body).await?;

        let now = Utc::now();
        let record = DatasetRecord {
            owner: owner.clone(),
            project: project.clone(),
            name: name.clone(),
            content_path,
            size_bytes: body.len() as u64,
            sha256: compute_hash(&body),
            created_at: now,
            updated_at: now,
        };

        let inserted = match self.metadata.insert_dataset(&record) {
            Ok(inserted) => inserted,
            Err(error) => {
                self.remove_written_file(&owner, &project, &name).await;
                return Err(error);
            }
        };

        if !inserted {
            // The unique index rejected a racing create for the same triple;
            // compensate by removing the file this call just wrote.
            self.remove_written_file(&owner, &project, &name).await;
            return Ok(CreateDatasetOperationOutcome::NameConflict(name));
        }

        Ok(CreateDatasetOperationOutcome::Created(record))
    }

    async fn remove_written_file(&self, owner: &str, project: &str, name: &str) {
        if let Err(error) = self.files.remove(owner, project, name).await {
            tracing::warn!(
                "Failed to remove dataset file after insert failure: owner={} project={} name={} error={}",
                owner,
                project,
                name,
                error
            );
        }
    }
}

fn is_csv_content_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    media_type.eq_ignore_ascii_case("text/csv")
}
