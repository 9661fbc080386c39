//! Task CRUD, labels, comments and attachments

use std::sync::Arc;

use crate::api_client::{ApiClient, RequestDescriptor, UploadPayload};
use crate::constants::{UPLOAD_ALLOWED_TYPES, UPLOAD_MAX_SIZE};
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::{Attachment, Comment, Task, TaskStatus};
use crate::types::{ApiResponse, CreateComment, CreateTask, Paginated, TaskFilter, UpdateTask};

pub struct TaskService {
    client: Arc<ApiClient>,
}

impl TaskService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list_by_project(
        &self,
        project_id: &str,
        filter: &TaskFilter,
    ) -> Result<Paginated<Task>> {
        self.client
            .get_query(endpoints::tasks::by_project(project_id), filter.to_query())
            .await
    }

    /// Tasks assigned to the authenticated user. Overrides any assignee
    /// set on the filter.
    pub async fn my_tasks(&self, filter: &TaskFilter) -> Result<Paginated<Task>> {
        let mut filter = filter.clone();
        filter.assignee_id = Some("me".to_string());
        self.client
            .get_query(endpoints::tasks::BASE, filter.to_query())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Task> {
        let resp: ApiResponse<Task> = self.client.get(endpoints::tasks::by_id(id)).await?;
        Ok(resp.data)
    }

    pub async fn create(&self, project_id: &str, task: &CreateTask) -> Result<Task> {
        let resp: ApiResponse<Task> = self
            .client
            .post(endpoints::tasks::by_project(project_id), task)
            .await?;
        Ok(resp.data)
    }

    pub async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task> {
        let resp: ApiResponse<Task> =
            self.client.put(endpoints::tasks::by_id(id), changes).await?;
        Ok(resp.data)
    }

    pub async fn update_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        let body = serde_json::json!({ "status": status.as_str() });
        let resp: ApiResponse<Task> =
            self.client.patch(endpoints::tasks::status(id), &body).await?;
        Ok(resp.data)
    }

    /// Assign (or unassign with `None`) a task.
    pub async fn assign(&self, id: &str, user_id: Option<&str>) -> Result<Task> {
        let body = serde_json::json!({ "userId": user_id });
        let resp: ApiResponse<Task> =
            self.client.patch(endpoints::tasks::assign(id), &body).await?;
        Ok(resp.data)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_unit(endpoints::tasks::by_id(id)).await
    }

    pub async fn add_labels(&self, task_id: &str, label_ids: &[String]) -> Result<Task> {
        let body = serde_json::json!({ "labelIds": label_ids });
        let resp: ApiResponse<Task> = self
            .client
            .post(endpoints::tasks::labels(task_id), &body)
            .await?;
        Ok(resp.data)
    }

    pub async fn remove_label(&self, task_id: &str, label_id: &str) -> Result<Task> {
        let resp: ApiResponse<Task> = self
            .client
            .execute(RequestDescriptor::delete(endpoints::tasks::label_by_id(
                task_id, label_id,
            )))
            .await?;
        Ok(resp.data)
    }

    pub async fn comments(&self, task_id: &str) -> Result<Paginated<Comment>> {
        self.client.get(endpoints::tasks::comments(task_id)).await
    }

    pub async fn add_comment(&self, task_id: &str, comment: &CreateComment) -> Result<Comment> {
        let resp: ApiResponse<Comment> = self
            .client
            .post(endpoints::tasks::comments(task_id), comment)
            .await?;
        Ok(resp.data)
    }

    pub async fn delete_comment(&self, task_id: &str, comment_id: &str) -> Result<()> {
        self.client
            .delete_unit(endpoints::tasks::comment_by_id(task_id, comment_id))
            .await
    }

    /// Upload an attachment. Size and MIME type are checked against the
    /// backend's limits before any bytes leave the process.
    pub async fn upload_attachment(
        &self,
        task_id: &str,
        payload: UploadPayload,
    ) -> Result<Attachment> {
        if payload.size() > UPLOAD_MAX_SIZE {
            return Err(ClientError::UploadRejected(format!(
                "attachment is {} bytes, limit is {UPLOAD_MAX_SIZE}",
                payload.size()
            )));
        }
        if !UPLOAD_ALLOWED_TYPES.contains(&payload.mime_type()) {
            return Err(ClientError::UploadRejected(format!(
                "MIME type {} is not accepted",
                payload.mime_type()
            )));
        }

        let resp: ApiResponse<Attachment> = self
            .client
            .upload(endpoints::tasks::attachments(task_id), payload)
            .await?;
        Ok(resp.data)
    }

    pub async fn delete_attachment(&self, task_id: &str, attachment_id: &str) -> Result<()> {
        self.client
            .delete_unit(endpoints::tasks::attachment_by_id(task_id, attachment_id))
            .await
    }

    pub async fn search(&self, query: &str, project_id: Option<&str>) -> Result<Vec<Task>> {
        let mut pairs = vec![("q".to_string(), query.to_string())];
        if let Some(project_id) = project_id {
            pairs.push(("projectId".to_string(), project_id.to_string()));
        }
        let resp: ApiResponse<Vec<Task>> = self
            .client
            .execute(RequestDescriptor::get(endpoints::search::TASKS).query(pairs))
            .await?;
        Ok(resp.data)
    }
}
