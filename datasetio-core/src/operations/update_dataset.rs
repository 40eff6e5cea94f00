use crate::error::Result;
use crate::storage::{DatasetRecord, FileStore, MetadataStore, compute_hash};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct UpdateDatasetOperation {
    metadata: Arc<MetadataStore>,
    files: Arc<FileStore>,
}

#[derive(Debug, Clone)]
pub struct UpdateDatasetOperationRequest {
    pub owner: String,
    pub project: String,
    pub name: String,
    /// Rename target; None keeps the existing name.
    pub new_name: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub enum UpdateDatasetOperationOutcome {
    Updated(DatasetRecord),
    NotFound,
    NameConflict(String),
}

impl UpdateDatasetOperation {
    pub fn new(metadata: Arc<MetadataStore>, files: Arc<FileStore>) -> Self {
        Self { metadata, files }
    }

    pub async fn run(
        &self,
        request: UpdateDatasetOperationRequest,
    ) -> Result<UpdateDatasetOperationOutcome> {
        let UpdateDatasetOperationRequest {
            owner,
            project,
            name,
            new_name,
            body,
        } = request;

        self.metadata.ping()?;

        let Some(existing) = self.metadata.find_dataset(&owner, &project, &name)? else {
            return Ok(UpdateDatasetOperationOutcome::NotFound);
        };

        let new_name = new_name.unwrap_or_else(|| name.clone());
        let content_path = FileStore::relative_path(&owner, &project, &new_name)?;

        if new_name != name {
            if self
                .metadata
                .find_dataset(&owner, &project, &new_name)?
                .is_some()
            {
                return Ok(UpdateDatasetOperationOutcome::NameConflict(new_name));
            }

            self.files.rename(&owner, &project, &name, &new_name).await?;
        }

        self.files.write(&owner, &project, &new_name, &body).await?;

        let now = Utc::now();
        let updated = DatasetRecord {
            owner: owner.clone(),
            project: project.clone(),
            name: new_name,
            content_path,
            size_bytes: body.len() as u64,
            sha256: compute_hash(&body),
            created_at: existing.created_at,
            updated_at: now,
        };

        // Rename and overwrite have already happened; a miss here means the
        // record vanished mid-sequence and the filesystem stays as written.
        match self.metadata.update_dataset(&owner, &project, &name, &updated)? {
            Some(record) => Ok(UpdateDatasetOperationOutcome::Updated(record)),
            None => Ok(UpdateDatasetOperationOutcome::NotFound),
        }
    }
}
