//! Projects, users and membership.
//!
//! A project owns its tasks and keeps an ordered list of members. Users live
//! in the `Database` and are referenced by id from members and task assignees.

use serde::{Deserialize, Serialize};

use crate::fields::Role;
use crate::task::Task;

/// A person who can be a project member and a task assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A user's membership in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: u64,
    #[serde(default)]
    pub role: Role,
}

/// A project with its ordered tasks and members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    members: Vec<Member>,
}

impl Project {
    pub fn new(id: u64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Project {
            id,
            name: name.into(),
            description: description.into(),
            tasks: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Generate the next available task id.
    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Append a task, returning its id.
    pub fn add_task(&mut self, task: Task) -> u64 {
        let id = task.id;
        self.tasks.push(task);
        id
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Add a member, or update the role of an existing one. Returns true if
    /// the user was not a member before.
    pub fn add_member(&mut self, user_id: u64, role: Role) -> bool {
        if let Some(existing) = self.members.iter_mut().find(|m| m.user_id == user_id) {
            existing.role = role;
            return false;
        }
        self.members.push(Member { user_id, role });
        true
    }

    pub fn is_member(&self, user_id: u64) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

/// Convert a display name to a safe name for file naming.
/// Converts to lowercase and collapses every run of non-alphanumerics into one underscore.
pub fn sanitize_project_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use chrono::NaiveDate;

    #[test]
    fn test_sanitize_project_name() {
        assert_eq!(sanitize_project_name("My Project"), "my_project");
        assert_eq!(sanitize_project_name("Test-Project_123"), "test_project_123");
        assert_eq!(sanitize_project_name("Special!@#$%Characters"), "special_characters");
        assert_eq!(sanitize_project_name("  Multiple   Spaces  "), "multiple_spaces");
        assert_eq!(sanitize_project_name("../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_project_name(""), "");
    }

    #[test]
    fn test_next_task_id_and_lookup() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mut p = Project::new(1, "Board", "");
        assert_eq!(p.next_task_id(), 1);
        p.add_task(Task::new(1, "a", Priority::Low, created));
        p.add_task(Task::new(5, "b", Priority::Low, created));
        assert_eq!(p.next_task_id(), 6);
        assert_eq!(p.task(5).map(|t| t.title.as_str()), Some("b"));
        assert!(p.task_mut(2).is_none());
    }

    #[test]
    fn test_members_dedupe_by_user() {
        let mut p = Project::new(1, "Board", "");
        assert!(p.add_member(7, Role::Admin));
        assert!(!p.add_member(7, Role::Viewer));
        assert_eq!(p.members().len(), 1);
        assert_eq!(p.members()[0].role, Role::Viewer);
        assert!(p.is_member(7));
        assert!(!p.is_member(8));
    }
}
