//! Task data structure and lifecycle.
//!
//! A `Task` is the source of every report fact. Its lifecycle timestamps are
//! private and only move through `set_state`, which keeps two invariants:
//! the start timestamp is written once, on the first move into
//! `InProgress`, and the close timestamp is present exactly while the task is
//! `Completed`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;
use crate::fields::*;

/// Joins label names in a single report cell. Never part of a label name.
pub const LABEL_SEPARATOR: char = ';';

/// A named, optionally coloured label attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Label {
    /// Build a label, turning any `LABEL_SEPARATOR` in the name into a space.
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        let name = name.into().replace(LABEL_SEPARATOR, " ");
        Label { name: name.trim().to_string(), color }
    }

    /// Parse `name` or `name:color`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, color)) if !color.trim().is_empty() => {
                Label::new(name, Some(color.trim().to_string()))
            }
            Some((name, _)) => Label::new(name, None),
            None => Label::new(raw, None),
        }
    }

    fn same_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// A work item tracked inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// User id of the assignee.
    pub assignee: Option<u64>,
    pub due: Option<CalendarDate>,
    pub priority: Priority,
    state: State,
    #[serde(default)]
    labels: Vec<Label>,
    created_at: NaiveDateTime,
    started_at: Option<NaiveDateTime>,
    closed_at: Option<NaiveDateTime>,
}

impl Task {
    /// Create a pending task. `created_at` is fixed for the task's lifetime.
    pub fn new(id: u64, title: impl Into<String>, priority: Priority, created_at: NaiveDateTime) -> Self {
        Task {
            id,
            title: title.into(),
            description: String::new(),
            assignee: None,
            due: None,
            priority,
            state: State::Pending,
            labels: Vec::new(),
            created_at,
            started_at: None,
            closed_at: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn started_at(&self) -> Option<NaiveDateTime> {
        self.started_at
    }

    pub fn closed_at(&self) -> Option<NaiveDateTime> {
        self.closed_at
    }

    pub fn progress(&self) -> u32 {
        self.state.progress()
    }

    /// Move the task to `state` at instant `at`. Returns false when the task
    /// was already in that state.
    pub fn set_state(&mut self, state: State, at: NaiveDateTime) -> bool {
        if self.state == state {
            return false;
        }
        if state == State::InProgress && self.started_at.is_none() {
            self.started_at = Some(at);
        }
        self.closed_at = match state {
            State::Completed => Some(at),
            _ => None,
        };
        self.state = state;
        true
    }

    /// Attach a label unless one with the same name (ignoring case) exists.
    /// Empty names and names containing `LABEL_SEPARATOR` are refused.
    pub fn add_label(&mut self, label: Label) -> bool {
        if label.name.trim().is_empty()
            || label.name.contains(LABEL_SEPARATOR)
            || self.labels.iter().any(|l| l.same_name(&label.name))
        {
            return false;
        }
        self.labels.push(label);
        true
    }

    pub fn remove_label(&mut self, name: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| !l.same_name(name));
        self.labels.len() != before
    }

    /// Label names joined with `LABEL_SEPARATOR`, in insertion order.
    pub fn label_names(&self) -> String {
        let names: Vec<&str> = self.labels.iter().map(|l| l.name.as_str()).collect();
        names.join(LABEL_SEPARATOR.to_string().as_str())
    }

    /// Check the timestamp invariants on data read back from storage.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.closed_at.is_some() != (self.state == State::Completed) {
            return Err(format!(
                "task {} has state {} but close timestamp {:?}",
                self.id,
                self.state.name(),
                self.closed_at
            ));
        }
        if self.state == State::InProgress && self.started_at.is_none() {
            return Err(format!("task {} is in progress without a start timestamp", self.id));
        }
        if let Some(label) = self.labels.iter().find(|l| l.name.contains(LABEL_SEPARATOR)) {
            return Err(format!("task {} has label '{}' containing '{}'", self.id, label.name, LABEL_SEPARATOR));
        }
        Ok(())
    }
}
