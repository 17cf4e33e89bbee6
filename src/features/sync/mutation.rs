//! Mutations that can be queued for delivery.
//!
//! A mutation is the payload of a queue entry. It is serialized as a tagged
//! JSON object (`{"kind": "create_task", ...}`) both in local storage and on
//! the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{ColumnId, ItemId};

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse a priority name.
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
}

/// Payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProject {
    pub workspace_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_personal: bool,
}

/// Payload for updating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProject {
    pub project_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for moving a card between (or within) kanban columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTask {
    pub project_id: i64,
    pub task_id: ItemId,
    pub from_column: ColumnId,
    pub to_column: ColumnId,
    pub index: usize,
}

/// A queued mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    CreateTask(CreateTask),
    CreateProject(CreateProject),
    UpdateProject(UpdateProject),
    DeleteProject { project_id: i64 },
    MoveTask(MoveTask),
}

impl Mutation {
    /// Short human-readable name for listings.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::CreateTask(_) => "Create Task",
            Self::CreateProject(_) => "Create Project",
            Self::UpdateProject(_) => "Update Project",
            Self::DeleteProject { .. } => "Delete Project",
            Self::MoveTask(_) => "Move Task",
        }
    }

    /// One-line description of what the mutation does.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::CreateTask(t) => format!("\"{}\" in project {}", t.title, t.project_id),
            Self::CreateProject(p) => format!("\"{}\" in workspace {}", p.name, p.workspace_id),
            Self::UpdateProject(p) => format!("project {}", p.project_id),
            Self::DeleteProject { project_id } => format!("project {project_id}"),
            Self::MoveTask(m) => format!(
                "{} {} -> {}[{}]",
                m.task_id, m.from_column, m.to_column, m.index
            ),
        }
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a known mutation.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<CreateTask> for Mutation {
    fn from(t: CreateTask) -> Self {
        Self::CreateTask(t)
    }
}

impl From<CreateProject> for Mutation {
    fn from(p: CreateProject) -> Self {
        Self::CreateProject(p)
    }
}

impl From<UpdateProject> for Mutation {
    fn from(p: UpdateProject) -> Self {
        Self::UpdateProject(p)
    }
}

impl From<MoveTask> for Mutation {
    fn from(m: MoveTask) -> Self {
        Self::MoveTask(m)
    }
}
