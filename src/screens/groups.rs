use async_trait::async_trait;

use super::Fetch;
use crate::api::ApiGateway;
use crate::error::AppError;
use crate::models::{GroupDetails, GroupSummary};

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupsList;

#[async_trait]
impl Fetch for GroupsList {
    type Key = ();
    type Output = Vec<GroupSummary>;

    const NAME: &'static str = "groups list";

    async fn fetch(&self, api: &dyn ApiGateway, _key: &()) -> Result<Self::Output, AppError> {
        api.list_my_groups().await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDetailsScreen;

#[async_trait]
impl Fetch for GroupDetailsScreen {
    type Key = String;
    type Output = GroupDetails;

    const NAME: &'static str = "group details";

    async fn fetch(&self, api: &dyn ApiGateway, id: &String) -> Result<Self::Output, AppError> {
        api.get_group_details(id).await
    }
}

/// Admin view over every group on the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllGroups;

#[async_trait]
impl Fetch for AllGroups {
    type Key = ();
    type Output = Vec<GroupSummary>;

    const NAME: &'static str = "all groups";

    async fn fetch(&self, api: &dyn ApiGateway, _key: &()) -> Result<Self::Output, AppError> {
        api.list_all_groups().await
    }
}
