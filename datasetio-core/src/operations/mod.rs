pub mod create_dataset;
pub mod delete_dataset;
pub mod get_dataset;
pub mod list_datasets;
pub mod register_project;
pub mod update_dataset;

pub use create_dataset::{
    CreateDatasetOperation, CreateDatasetOperationOutcome, CreateDatasetOperationRequest,
};
pub use delete_dataset::{
    DeleteDatasetOperation, DeleteDatasetOperationOutcome, DeleteDatasetOperationRequest,
};
pub use get_dataset::{
    GetDatasetOperation, GetDatasetOperationOutcome, GetDatasetOperationRequest,
    GetDatasetOperationResult,
};
pub use list_datasets::{
    ListDatasetsOperation, ListDatasetsOperationOutcome, ListDatasetsOperationRequest,
};
pub use register_project::{
    RegisterProjectOperation, RegisterProjectOperationOutcome, RegisterProjectOperationRequest,
};
pub use update_dataset::{
    UpdateDatasetOperation, UpdateDatasetOperationOutcome, UpdateDatasetOperationRequest,
};
