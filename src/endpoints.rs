//! API route builders
//!
//! All paths are relative to the configured base URL and carry the
//! versioned prefix. Parameterized routes are functions; fixed routes
//! are constants.

pub const API_VERSION: &str = "/v1";

pub mod auth {
    pub const LOGIN: &str = "/v1/auth/login";
    pub const REGISTER: &str = "/v1/auth/register";
    pub const LOGOUT: &str = "/v1/auth/logout";
    pub const REFRESH: &str = "/v1/auth/refresh";
    pub const VERIFY_EMAIL: &str = "/v1/auth/verify-email";
    pub const FORGOT_PASSWORD: &str = "/v1/auth/forgot-password";
    pub const RESET_PASSWORD: &str = "/v1/auth/reset-password";
    pub const ME: &str = "/v1/auth/me";
}

pub mod users {
    pub const BASE: &str = "/v1/users";
    pub const CHANGE_PASSWORD: &str = "/v1/users/change-password";

    pub fn by_id(id: &str) -> String {
        format!("/v1/users/{id}")
    }
}

pub mod projects {
    pub const BASE: &str = "/v1/projects";

    pub fn by_id(id: &str) -> String {
        format!("/v1/projects/{id}")
    }

    pub fn members(id: &str) -> String {
        format!("/v1/projects/{id}/members")
    }

    pub fn member_by_id(project_id: &str, member_id: &str) -> String {
        format!("/v1/projects/{project_id}/members/{member_id}")
    }

    pub fn invite(id: &str) -> String {
        format!("/v1/projects/{id}/invite")
    }

    pub fn stats(id: &str) -> String {
        format!("/v1/projects/{id}/stats")
    }

    pub fn archive(id: &str) -> String {
        format!("/v1/projects/{id}/archive")
    }

    pub fn unarchive(id: &str) -> String {
        format!("/v1/projects/{id}/unarchive")
    }

    pub fn labels(id: &str) -> String {
        format!("/v1/projects/{id}/labels")
    }
}

pub mod tasks {
    pub const BASE: &str = "/v1/tasks";

    pub fn by_id(id: &str) -> String {
        format!("/v1/tasks/{id}")
    }

    pub fn by_project(project_id: &str) -> String {
        format!("/v1/projects/{project_id}/tasks")
    }

    pub fn status(id: &str) -> String {
        format!("/v1/tasks/{id}/status")
    }

    pub fn assign(id: &str) -> String {
        format!("/v1/tasks/{id}/assign")
    }

    pub fn labels(id: &str) -> String {
        format!("/v1/tasks/{id}/labels")
    }

    pub fn label_by_id(task_id: &str, label_id: &str) -> String {
        format!("/v1/tasks/{task_id}/labels/{label_id}")
    }

    pub fn attachments(id: &str) -> String {
        format!("/v1/tasks/{id}/attachments")
    }

    pub fn attachment_by_id(task_id: &str, attachment_id: &str) -> String {
        format!("/v1/tasks/{task_id}/attachments/{attachment_id}")
    }

    pub fn comments(task_id: &str) -> String {
        format!("/v1/tasks/{task_id}/comments")
    }

    pub fn comment_by_id(task_id: &str, comment_id: &str) -> String {
        format!("/v1/tasks/{task_id}/comments/{comment_id}")
    }
}

pub mod notifications {
    pub const BASE: &str = "/v1/notifications";
    pub const MARK_ALL_READ: &str = "/v1/notifications/read-all";
    pub const UNREAD_COUNT: &str = "/v1/notifications/unread-count";

    pub fn by_id(id: &str) -> String {
        format!("/v1/notifications/{id}")
    }

    pub fn mark_read(id: &str) -> String {
        format!("/v1/notifications/{id}/read")
    }
}

pub mod dashboard {
    pub const PERSONAL: &str = "/v1/dashboard/personal";
    pub const ACTIVITIES: &str = "/v1/dashboard/activities";

    pub fn project(project_id: &str) -> String {
        format!("/v1/dashboard/project/{project_id}")
    }
}

pub mod search {
    pub const GLOBAL: &str = "/v1/search";
    pub const TASKS: &str = "/v1/search/tasks";
    pub const PROJECTS: &str = "/v1/search/projects";
    pub const USERS: &str = "/v1/search/users";
}

pub mod upload {
    pub const FILE: &str = "/v1/upload/file";
    pub const IMAGE: &str = "/v1/upload/image";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterized_routes() {
        assert_eq!(projects::by_id("p1"), "/v1/projects/p1");
        assert_eq!(
            projects::member_by_id("p1", "m2"),
            "/v1/projects/p1/members/m2"
        );
        assert_eq!(tasks::by_project("p1"), "/v1/projects/p1/tasks");
        assert_eq!(
            tasks::attachment_by_id("t1", "a2"),
            "/v1/tasks/t1/attachments/a2"
        );
        assert_eq!(notifications::mark_read("n1"), "/v1/notifications/n1/read");
    }
}
