use crate::error::Result;
use crate::storage::file_store::validate_segment;
use crate::storage::{MetadataStore, ProjectRecord};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct RegisterProjectOperation {
    metadata: Arc<MetadataStore>,
}

#[derive(Debug, Clone)]
pub struct RegisterProjectOperationRequest {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum RegisterProjectOperationOutcome {
    Registered(ProjectRecord),
    AlreadyExists,
}

impl RegisterProjectOperation {
    pub fn new(metadata: Arc<MetadataStore>) -> Self {
        Self { metadata }
    }

    pub async fn run(
        &self,
        request: RegisterProjectOperationRequest,
    ) -> Result<RegisterProjectOperationOutcome> {
        let RegisterProjectOperationRequest { owner, name } = request;

        self.metadata.ping()?;

        // Owner and project become directory names under the storage root,
        // so they are held to the same rules as dataset names.
        validate_segment(&owner)?;
        validate_segment(&name)?;

        let record = ProjectRecord {
            owner,
            name,
            created_at: Utc::now(),
        };

        if !self.metadata.insert_project(&record)? {
            return Ok(RegisterProjectOperationOutcome::AlreadyExists);
        }

        Ok(RegisterProjectOperationOutcome::Registered(record))
    }
}
