//! Enumerations and field types for tasks and projects.
//!
//! This module defines the structured values used to classify tasks and
//! project members, plus the output formats a report can be produced in.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task priority. `Urgent` outranks `Important`, which outranks `Medium`, then `Low`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Urgent,
    Important,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank, 1 being the most urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 1,
            Priority::Important => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    /// Canonical name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Priority::Urgent => "URGENT",
            Priority::Important => "IMPORTANT",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::Important => "Important",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    /// Greater means more urgent.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.rank().cmp(&self.rank())
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    Pending,
    InProgress,
    Completed,
}

impl State {
    /// Canonical name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            State::Pending => "PENDING",
            State::InProgress => "IN_PROGRESS",
            State::Completed => "COMPLETED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            State::Pending => "Pending",
            State::InProgress => "In progress",
            State::Completed => "Completed",
        }
    }

    /// Progress score contributed by a task in this state.
    pub fn progress(self) -> u32 {
        match self {
            State::Pending => 0,
            State::InProgress => 50,
            State::Completed => 100,
        }
    }
}

/// Role a user holds within a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    #[default]
    Editor,
    Viewer,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Editor => "Editor",
            Role::Viewer => "Viewer",
        }
    }
}

/// Artifact produced by `kt report`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Html,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
        }
    }
}
