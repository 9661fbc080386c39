//! Request/response envelopes and DTOs for the TaskFlow API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use crate::models::{MemberRole, TaskPriority, TaskStatus, User};

/// Single-resource envelope: `{ "data": ..., "message"?: ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Collection envelope with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Structured error body: `{ "error": { "code", "message", "details"? } }`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

/// Page/limit query parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageQuery {
    /// Page/limit pair; the limit is clamped to the backend's maximum.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit: limit.min(MAX_LIMIT),
        }
    }

    pub(crate) fn to_query(self) -> Vec<(String, String)> {
        vec![
            ("page".into(), self.page.to_string()),
            ("limit".into(), self.limit.to_string()),
        ]
    }
}

// ─── Auth ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
}

/// Credential pair returned by login, registration and refresh.
///
/// The refresh token is optional; a refresh response may rotate only the
/// access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub user: Option<User>,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

// ─── Projects ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMember {
    pub email: String,
    pub role: MemberRole,
}

// ─── Tasks ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
}

impl TaskSortField {
    fn as_str(&self) -> &'static str {
        match self {
            TaskSortField::CreatedAt => "createdAt",
            TaskSortField::UpdatedAt => "updatedAt",
            TaskSortField::DueDate => "dueDate",
            TaskSortField::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter/sort/pagination parameters for task listings.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<String>,
    pub label_ids: Vec<String>,
    pub due_date_from: Option<DateTime<Utc>>,
    pub due_date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub sort_by: Option<TaskSortField>,
    pub sort_order: Option<SortOrder>,
}

impl TaskFilter {
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut q = Vec::new();
        if let Some(page) = self.page {
            q.push(("page".into(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            q.push(("limit".into(), limit.to_string()));
        }
        if let Some(status) = self.status {
            q.push(("status".into(), status.as_str().into()));
        }
        if let Some(priority) = self.priority {
            q.push(("priority".into(), priority.as_str().into()));
        }
        if let Some(assignee) = &self.assignee_id {
            q.push(("assigneeId".into(), assignee.clone()));
        }
        if !self.label_ids.is_empty() {
            q.push(("labelIds".into(), self.label_ids.join(",")));
        }
        if let Some(from) = self.due_date_from {
            q.push(("dueDateFrom".into(), from.to_rfc3339()));
        }
        if let Some(to) = self.due_date_to {
            q.push(("dueDateTo".into(), to.to_rfc3339()));
        }
        if let Some(search) = &self.search {
            q.push(("search".into(), search.clone()));
        }
        if let Some(sort_by) = self.sort_by {
            q.push(("sortBy".into(), sort_by.as_str().into()));
        }
        if let Some(order) = self.sort_order {
            q.push(("sortOrder".into(), order.as_str().into()));
        }
        q
    }
}

// ─── Comments ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
}

// ─── Uploads ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_parsing() {
        let json = r#"{
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "title must not be empty",
                "details": [{"field": "title", "message": "required"}]
            }
        }"#;
        let parsed: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.code, "VALIDATION_ERROR");
        assert_eq!(parsed.error.details.len(), 1);
        assert_eq!(parsed.error.details[0].field, "title");
    }

    #[test]
    fn test_error_envelope_without_details() {
        let json = r#"{"error":{"code":"FORBIDDEN","message":"no"}}"#;
        let parsed: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert!(parsed.error.details.is_empty());
    }

    #[test]
    fn test_task_filter_query_pairs() {
        let filter = TaskFilter {
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            assignee_id: Some("me".into()),
            label_ids: vec!["l1".into(), "l2".into()],
            sort_by: Some(TaskSortField::DueDate),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let q = filter.to_query();
        assert!(q.contains(&("status".into(), "inProgress".into())));
        assert!(q.contains(&("priority".into(), "high".into())));
        assert!(q.contains(&("assigneeId".into(), "me".into())));
        assert!(q.contains(&("labelIds".into(), "l1,l2".into())));
        assert!(q.contains(&("sortBy".into(), "dueDate".into())));
        assert!(q.contains(&("sortOrder".into(), "asc".into())));
    }

    #[test]
    fn test_empty_filter_produces_no_pairs() {
        assert!(TaskFilter::default().to_query().is_empty());
    }

    #[test]
    fn test_page_query_limit_clamped() {
        assert_eq!(PageQuery::new(1, 500).limit, MAX_LIMIT);
        assert_eq!(PageQuery::default().limit, 20);
    }

    #[test]
    fn test_update_task_skips_unset_fields() {
        let update = UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "completed"}));
    }
}
