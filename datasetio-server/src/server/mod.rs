use crate::config::Config;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use datasetio_core::{
    CreateDatasetOperation, DatasetError, DeleteDatasetOperation, FileStore, GetDatasetOperation,
    ListDatasetsOperation, MetadataStore, RegisterProjectOperation, Result,
    UpdateDatasetOperation,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod external;
mod types;

use external::{
    health, root, v1_create_dataset, v1_delete_dataset, v1_get_dataset, v1_list_datasets,
    v1_register_project, v1_update_dataset,
};
pub(crate) use types::*;

pub struct ServerState {
    pub(crate) metadata: Arc<MetadataStore>,
    pub(crate) create_dataset_operation: Arc<CreateDatasetOperation>,
    pub(crate) get_dataset_operation: Arc<GetDatasetOperation>,
    pub(crate) list_datasets_operation: Arc<ListDatasetsOperation>,
    pub(crate) update_dataset_operation: Arc<UpdateDatasetOperation>,
    pub(crate) delete_dataset_operation: Arc<DeleteDatasetOperation>,
    pub(crate) register_project_operation: Arc<RegisterProjectOperation>,
}

pub async fn run_server(config: Config) -> Result<()> {
    // The file store creates the data directory, so it comes up first.
    let files = Arc::new(FileStore::new(config.storage.storage_root())?);
    let metadata = Arc::new(MetadataStore::open(config.storage.metadata_db_path())?);

    let create_dataset_operation = Arc::new(CreateDatasetOperation::new(
        metadata.clone(),
        files.clone(),
    ));
    let get_dataset_operation =
        Arc::new(GetDatasetOperation::new(metadata.clone(), files.clone()));
    let list_datasets_operation = Arc::new(ListDatasetsOperation::new(metadata.clone()));
    let update_dataset_operation = Arc::new(UpdateDatasetOperation::new(
        metadata.clone(),
        files.clone(),
    ));
    let delete_dataset_operation = Arc::new(DeleteDatasetOperation::new(
        metadata.clone(),
        files.clone(),
    ));
    let register_project_operation = Arc::new(RegisterProjectOperation::new(metadata.clone()));

    let state = Arc::new(ServerState {
        metadata,
        create_dataset_operation,
        get_dataset_operation,
        list_datasets_operation,
        update_dataset_operation,
        delete_dataset_operation,
        register_project_operation,
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/projects", post(v1_register_project))
        .route(
            "/api/v1/datasets",
            get(v1_list_datasets)
                .post(v1_create_dataset)
                .put(v1_update_dataset)
                .delete(v1_delete_dataset),
        )
        .route("/api/v1/datasets/content", get(v1_get_dataset))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("Datasetio listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|error| DatasetError::Http(error.to_string()))?;

    Ok(())
}

pub(crate) fn response_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub(crate) fn failure_status(error: &DatasetError) -> StatusCode {
    match error {
        DatasetError::InvalidSegment(_) | DatasetError::InvalidRequest(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
