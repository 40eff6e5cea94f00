use super::{
    DatasetItem, DatasetQuery, DatasetResponse, HealthResponse, ListResponse, MessageResponse,
    ProjectResponse, RegisterProjectRequest, RootResponse, ScopeQuery, ServerState, UpdateQuery,
    failure_status, response_error,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use datasetio_core::{
    CreateDatasetOperationOutcome, CreateDatasetOperationRequest, DeleteDatasetOperationOutcome,
    DeleteDatasetOperationRequest, GetDatasetOperationOutcome, GetDatasetOperationRequest,
    ListDatasetsOperationOutcome, ListDatasetsOperationRequest, RegisterProjectOperationOutcome,
    RegisterProjectOperationRequest, UpdateDatasetOperationOutcome, UpdateDatasetOperationRequest,
};
use std::sync::Arc;

pub(crate) async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Datasetio dataset management service".to_string(),
    })
}

pub(crate) async fn health(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if let Err(error) = state.metadata.ping() {
        return response_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string());
    }

    let datasets: Vec<DatasetItem> = match state.metadata.list_all_datasets() {
        Ok(records) => records.into_iter().map(DatasetItem::from).collect(),
        Err(error) => {
            return response_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string());
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            datasets,
        }),
    )
        .into_response()
}

pub(crate) async fn v1_register_project(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RegisterProjectRequest>,
) -> impl IntoResponse {
    let outcome = state
        .register_project_operation
        .run(RegisterProjectOperationRequest {
            owner: request.owner,
            name: request.name,
        })
        .await;

    match outcome {
        Ok(RegisterProjectOperationOutcome::Registered(record)) => (
            StatusCode::OK,
            Json(ProjectResponse {
                owner: record.owner,
                name: record.name,
                created_at: record.created_at.to_rfc3339(),
            }),
        )
            .into_response(),
        Ok(RegisterProjectOperationOutcome::AlreadyExists) => {
            response_error(StatusCode::CONFLICT, "project already exists")
        }
        Err(error) => response_error(failure_status(&error), error.to_string()),
    }
}

pub(crate) async fn v1_create_dataset(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<DatasetQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let outcome = state
        .create_dataset_operation
        .run(CreateDatasetOperationRequest {
            owner: query.owner,
            project: query.project,
            name: query.name,
            content_type,
            body,
        })
        .await;

    match outcome {
        Ok(CreateDatasetOperationOutcome::Created(record)) => (
            StatusCode::OK,
            Json(DatasetResponse {
                dataset: record.into(),
            }),
        )
            .into_response(),
        Ok(CreateDatasetOperationOutcome::InvalidContentType(content_type)) => response_error(
            StatusCode::BAD_REQUEST,
            format!("expected text/csv content, got {:?}", content_type),
        ),
        Ok(CreateDatasetOperationOutcome::ProjectNotFound) => {
            response_error(StatusCode::NOT_FOUND, "project not found")
        }
        Ok(CreateDatasetOperationOutcome::NameConflict(name)) => response_error(
            StatusCode::CONFLICT,
            format!(
                "a dataset named {:?} already exists under this owner and project",
                name
            ),
        ),
        Err(error) => response_error(failure_status(&error), error.to_string()),
    }
}

pub(crate) async fn v1_get_dataset(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<DatasetQuery>,
) -> impl IntoResponse {
    let outcome = state
        .get_dataset_operation
        .run(GetDatasetOperationRequest {
            owner: query.owner,
            project: query.project,
            name: query.name,
        })
        .await;

    let result = match outcome {
        Ok(GetDatasetOperationOutcome::Found(result)) => result,
        Ok(GetDatasetOperationOutcome::NotFound) => {
            return response_error(StatusCode::NOT_FOUND, "dataset not found");
        }
        Err(error) => return response_error(failure_status(&error), error.to_string()),
    };

    let mut response = Response::new(result.body.clone().into());
    *response.status_mut() = StatusCode::OK;

    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));

    if let Ok(value) = HeaderValue::from_str(&result.body.len().to_string()) {
        response.headers_mut().insert(header::CONTENT_LENGTH, value);
    }
    if let Ok(value) = HeaderValue::from_str(&result.record.sha256) {
        response.headers_mut().insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&result.record.content_path) {
        response
            .headers_mut()
            .insert("x-datasetio-content-path", value);
    }

    response
}

pub(crate) async fn v1_list_datasets(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let outcome = state
        .list_datasets_operation
        .run(ListDatasetsOperationRequest {
            owner: query.owner,
            project: query.project,
        })
        .await;

    match outcome {
        Ok(ListDatasetsOperationOutcome::Listed(records)) => (
            StatusCode::OK,
            Json(ListResponse {
                datasets: records.into_iter().map(DatasetItem::from).collect(),
            }),
        )
            .into_response(),
        Ok(ListDatasetsOperationOutcome::ProjectNotFound) => {
            response_error(StatusCode::NOT_FOUND, "project not found")
        }
        Err(error) => response_error(failure_status(&error), error.to_string()),
    }
}

pub(crate) async fn v1_update_dataset(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<UpdateQuery>,
    body: Bytes,
) -> impl IntoResponse {
    let outcome = state
        .update_dataset_operation
        .run(UpdateDatasetOperationRequest {
            owner: query.owner,
            project: query.project,
            name: query.name,
            new_name: query.new_name,
            body,
        })
        .await;

    match outcome {
        Ok(UpdateDatasetOperationOutcome::Updated(record)) => (
            StatusCode::OK,
            Json(DatasetResponse {
                dataset: record.into(),
            }),
        )
            .into_response(),
        Ok(UpdateDatasetOperationOutcome::NotFound) => {
            response_error(StatusCode::NOT_FOUND, "dataset not found")
        }
        Ok(UpdateDatasetOperationOutcome::NameConflict(name)) => response_error(
            StatusCode::CONFLICT,
            format!(
                "a dataset named {:?} already exists under this owner and project",
                name
            ),
        ),
        Err(error) => response_error(failure_status(&error), error.to_string()),
    }
}

pub(crate) async fn v1_delete_dataset(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<DatasetQuery>,
) -> impl IntoResponse {
    let outcome = state
        .delete_dataset_operation
        .run(DeleteDatasetOperationRequest {
            owner: query.owner,
            project: query.project,
            name: query.name,
        })
        .await;

    match outcome {
        Ok(DeleteDatasetOperationOutcome::Deleted(_)) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "dataset deleted".to_string(),
            }),
        )
            .into_response(),
        Ok(DeleteDatasetOperationOutcome::NotFound) => {
            response_error(StatusCode::NOT_FOUND, "dataset not found")
        }
        Err(error) => response_error(failure_status(&error), error.to_string()),
    }
}
