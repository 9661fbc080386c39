//! Notification listing and read-state management

use std::sync::Arc;

use crate::api_client::{ApiClient, RequestDescriptor};
use crate::endpoints;
use crate::error::Result;
use crate::models::Notification;
use crate::types::{ApiResponse, PageQuery, Paginated, UnreadCount};

pub struct NotificationService {
    client: Arc<ApiClient>,
}

impl NotificationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageQuery) -> Result<Paginated<Notification>> {
        self.client
            .get_query(endpoints::notifications::BASE, page.to_query())
            .await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let resp: ApiResponse<UnreadCount> = self
            .client
            .get(endpoints::notifications::UNREAD_COUNT)
            .await?;
        Ok(resp.data.count)
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.client
            .execute_unit(RequestDescriptor::patch(endpoints::notifications::mark_read(id)))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client
            .execute_unit(RequestDescriptor::post(endpoints::notifications::MARK_ALL_READ))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete_unit(endpoints::notifications::by_id(id))
            .await
    }
}
