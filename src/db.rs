//! File-backed store for users and projects.
//!
//! `Database` is the repository handle the CLI passes to every command. It is
//! loaded from and saved to a single JSON file; there is no process-wide state.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::project::{Project, User};

/// In-memory store of users and projects.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Database {
    /// Load the store from a JSON file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "store not found, starting empty");
            return Ok(Database::default());
        }
        let buf = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let db: Database = serde_json::from_str(&buf).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for task in db.projects.iter().flat_map(|p| p.tasks()) {
            task.check_invariants().map_err(StoreError::Invalid)?;
        }
        tracing::debug!(
            path = %path.display(),
            users = db.users.len(),
            projects = db.projects.len(),
            "store loaded"
        );
        Ok(db)
    }

    /// Save the store using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(self).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(data.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    pub fn next_user_id(&self) -> u64 {
        self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }

    pub fn next_project_id(&self) -> u64 {
        self.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Register a user. Emails are unique, ignoring case.
    pub fn add_user(&mut self, name: &str, email: &str) -> Result<&User, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("user name cannot be empty".into()));
        }
        let email = email.trim();
        if !email.is_empty() && self.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(StoreError::Invalid(format!("a user with email '{email}' already exists")));
        }
        let user = User {
            id: self.next_user_id(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Create a project. Names are unique, ignoring case.
    pub fn add_project(&mut self, name: &str, description: &str) -> Result<&mut Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("project name cannot be empty".into()));
        }
        if self.projects.iter().any(|p| p.name.to_lowercase() == name.to_lowercase()) {
            return Err(StoreError::Invalid(format!("project '{name}' already exists")));
        }
        let project = Project::new(self.next_project_id(), name, description.trim());
        self.projects.push(project);
        let last = self.projects.len() - 1;
        Ok(&mut self.projects[last])
    }

    /// Resolve a project identifier (either id or name) to its index.
    fn project_index(&self, identifier: &str) -> Result<usize, StoreError> {
        if let Ok(id) = identifier.parse::<u64>() {
            if let Some(idx) = self.projects.iter().position(|p| p.id == id) {
                return Ok(idx);
            }
        }

        let wanted = identifier.trim().to_lowercase();
        let matches: Vec<usize> = self
            .projects
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name.to_lowercase() == wanted)
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::NotFound {
                entity: "project",
                key: identifier.to_string(),
            }),
            [idx] => Ok(*idx),
            many => Err(StoreError::Ambiguous {
                entity: "project",
                key: identifier.to_string(),
                candidates: many
                    .iter()
                    .map(|&i| format!("#{}", self.projects[i].id))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Projects in creation order, restricted to those `member` belongs to
    /// when one is given.
    pub fn projects_for(&self, member: Option<u64>) -> impl Iterator<Item = &Project> + '_ {
        self.projects
            .iter()
            .filter(move |p| member.map_or(true, |uid| p.is_member(uid)))
    }

    pub fn project(&self, identifier: &str) -> Result<&Project, StoreError> {
        let idx = self.project_index(identifier)?;
        Ok(&self.projects[idx])
    }

    pub fn project_mut(&mut self, identifier: &str) -> Result<&mut Project, StoreError> {
        let idx = self.project_index(identifier)?;
        Ok(&mut self.projects[idx])
    }
}
