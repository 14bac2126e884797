use async_trait::async_trait;

use super::Fetch;
use crate::api::ApiGateway;
use crate::error::AppError;
use crate::models::{TaskDetails, TaskSummary};

#[derive(Debug, Clone, Copy, Default)]
pub struct TasksList;

#[async_trait]
impl Fetch for TasksList {
    type Key = ();
    type Output = Vec<TaskSummary>;

    const NAME: &'static str = "tasks list";

    async fn fetch(&self, api: &dyn ApiGateway, _key: &()) -> Result<Self::Output, AppError> {
        api.list_my_tasks().await
    }
}

/// Keyed by the selected task id.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDetailsScreen;

#[async_trait]
impl Fetch for TaskDetailsScreen {
    type Key = String;
    type Output = TaskDetails;

    const NAME: &'static str = "task details";

    async fn fetch(&self, api: &dyn ApiGateway, id: &String) -> Result<Self::Output, AppError> {
        api.get_task_details(id).await
    }
}
