//! Project CRUD, membership and statistics

use std::sync::Arc;

use crate::api_client::{ApiClient, RequestDescriptor};
use crate::endpoints;
use crate::error::Result;
use crate::models::{MemberRole, Project, ProjectMember, ProjectStats};
use crate::types::{ApiResponse, CreateProject, InviteMember, Paginated, UpdateProject};

pub struct ProjectService {
    client: Arc<ApiClient>,
}

impl ProjectService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Paginated<Project>> {
        self.client.get(endpoints::projects::BASE).await
    }

    pub async fn get(&self, id: &str) -> Result<Project> {
        let resp: ApiResponse<Project> = self.client.get(endpoints::projects::by_id(id)).await?;
        Ok(resp.data)
    }

    pub async fn create(&self, project: &CreateProject) -> Result<Project> {
        let resp: ApiResponse<Project> =
            self.client.post(endpoints::projects::BASE, project).await?;
        Ok(resp.data)
    }

    pub async fn update(&self, id: &str, changes: &UpdateProject) -> Result<Project> {
        let resp: ApiResponse<Project> = self
            .client
            .put(endpoints::projects::by_id(id), changes)
            .await?;
        Ok(resp.data)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_unit(endpoints::projects::by_id(id)).await
    }

    pub async fn archive(&self, id: &str) -> Result<Project> {
        let resp: ApiResponse<Project> = self
            .client
            .post_empty(endpoints::projects::archive(id))
            .await?;
        Ok(resp.data)
    }

    pub async fn unarchive(&self, id: &str) -> Result<Project> {
        let resp: ApiResponse<Project> = self
            .client
            .post_empty(endpoints::projects::unarchive(id))
            .await?;
        Ok(resp.data)
    }

    pub async fn members(&self, project_id: &str) -> Result<Vec<ProjectMember>> {
        let resp: ApiResponse<Vec<ProjectMember>> = self
            .client
            .get(endpoints::projects::members(project_id))
            .await?;
        Ok(resp.data)
    }

    pub async fn invite_member(
        &self,
        project_id: &str,
        invitation: &InviteMember,
    ) -> Result<ProjectMember> {
        let resp: ApiResponse<ProjectMember> = self
            .client
            .post(endpoints::projects::invite(project_id), invitation)
            .await?;
        Ok(resp.data)
    }

    pub async fn update_member_role(
        &self,
        project_id: &str,
        member_id: &str,
        role: MemberRole,
    ) -> Result<ProjectMember> {
        let body = serde_json::json!({ "role": role.as_str() });
        let resp: ApiResponse<ProjectMember> = self
            .client
            .patch(endpoints::projects::member_by_id(project_id, member_id), &body)
            .await?;
        Ok(resp.data)
    }

    pub async fn remove_member(&self, project_id: &str, member_id: &str) -> Result<()> {
        self.client
            .delete_unit(endpoints::projects::member_by_id(project_id, member_id))
            .await
    }

    pub async fn stats(&self, project_id: &str) -> Result<ProjectStats> {
        let resp: ApiResponse<ProjectStats> = self
            .client
            .get(endpoints::projects::stats(project_id))
            .await?;
        Ok(resp.data)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Project>> {
        let resp: ApiResponse<Vec<Project>> = self
            .client
            .execute(
                RequestDescriptor::get(endpoints::search::PROJECTS)
                    .query(vec![("q".into(), query.into())]),
            )
            .await?;
        Ok(resp.data)
    }
}
