//! Dashboard aggregation queries

use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::endpoints;
use crate::error::Result;
use crate::models::{Activity, DashboardStats, ProjectStats};
use crate::types::{ApiResponse, PageQuery, Paginated};

pub struct DashboardService {
    client: Arc<ApiClient>,
}

impl DashboardService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Personal dashboard: task counts plus today/this-week slices.
    pub async fn personal(&self) -> Result<DashboardStats> {
        let resp: ApiResponse<DashboardStats> =
            self.client.get(endpoints::dashboard::PERSONAL).await?;
        Ok(resp.data)
    }

    pub async fn project(&self, project_id: &str) -> Result<ProjectStats> {
        let resp: ApiResponse<ProjectStats> = self
            .client
            .get(endpoints::dashboard::project(project_id))
            .await?;
        Ok(resp.data)
    }

    pub async fn activities(&self, page: PageQuery) -> Result<Paginated<Activity>> {
        self.client
            .get_query(endpoints::dashboard::ACTIVITIES, page.to_query())
            .await
    }
}
