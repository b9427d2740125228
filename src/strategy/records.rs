use serde::{Deserialize, Serialize};

use super::graph::NodeKind;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, alias = "owner")]
    pub assignee: Option<String>,
}

/// Execution-level work serving one or more initiatives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, alias = "owner")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub initiative_ids: Vec<String>,
}

/// Dated checkpoint belonging to exactly one initiative.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub initiative_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    /// Id of the initiative or operation this task advances.
    #[serde(default)]
    pub strategic_item_id: Option<String>,
}

/// The four record collections the graph is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub initiatives: Vec<Initiative>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Portfolio {
    pub fn record_count(&self) -> usize {
        self.initiatives.len() + self.operations.len() + self.milestones.len() + self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Records of one kind, whether or not that kind is currently shown.
    pub fn count_of(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::Initiative => self.initiatives.len(),
            NodeKind::Operation => self.operations.len(),
            NodeKind::Milestone => self.milestones.len(),
            NodeKind::Task => self.tasks.len(),
        }
    }
}
