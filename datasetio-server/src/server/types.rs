use datasetio_core::DatasetRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    pub(crate) datasets: Vec<DatasetItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScopeQuery {
    pub(crate) owner: String,
    pub(crate) project: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatasetQuery {
    pub(crate) owner: String,
    pub(crate) project: String,
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateQuery {
    pub(crate) owner: String,
    pub(crate) project: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) new_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatasetItem {
    pub(crate) owner: String,
    pub(crate) project: String,
    pub(crate) name: String,
    pub(crate) content_path: String,
    pub(crate) size_bytes: u64,
    pub(crate) sha256: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<DatasetRecord> for DatasetItem {
    fn from(record: DatasetRecord) -> Self {
        Self {
            owner: record.owner,
            project: record.project,
            name: record.name,
            content_path: record.content_path,
            size_bytes: record.size_bytes,
            sha256: record.sha256,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DatasetResponse {
    pub(crate) dataset: DatasetItem,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListResponse {
    pub(crate) datasets: Vec<DatasetItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterProjectRequest {
    pub(crate) owner: String,
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectResponse {
    pub(crate) owner: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}
